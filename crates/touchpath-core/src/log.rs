//! Human-readable gesture log.
//!
//! The dispatcher reports checkpoint positions (and the final lift) as
//! [`SwipeLogEntry`] values through a [`SwipeLog`]. Intermediate move steps
//! are never logged, so a gesture produces a handful of entries rather than
//! one per step.
//!
//! Two sinks are provided: [`TracingLog`] emits `tracing` events, and
//! [`MemoryLog`] keeps entries in memory for inspection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// One gesture log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeLogEntry {
    /// Unique identifier for this entry.
    pub id: Uuid,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// The element the gesture runs on.
    pub element: String,
    /// Short name, e.g. `swipe start`, `swipe checkpoint 1`, `swipe end`.
    pub name: String,
    /// Message, e.g. `100, 300`.
    pub message: String,
}

impl SwipeLogEntry {
    /// Creates an entry with a fresh id and the current time.
    pub fn new(element: impl Into<String>, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            element: element.into(),
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Sink for gesture log entries.
pub trait SwipeLog: Send + Sync {
    /// Records one entry.
    fn record(&self, entry: SwipeLogEntry);
}

/// Emits every entry as an `info` level tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl SwipeLog for TracingLog {
    fn record(&self, entry: SwipeLogEntry) {
        info!(element = %entry.element, name = %entry.name, "{}", entry.message);
    }
}

/// Keeps entries in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    entries: Arc<Mutex<Vec<SwipeLogEntry>>>,
}

impl MemoryLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of all entries recorded so far.
    pub fn entries(&self) -> Vec<SwipeLogEntry> {
        self.entries.lock().clone()
    }

    /// `(name, message)` pairs of all entries, for quick assertions.
    pub fn lines(&self) -> Vec<(String, String)> {
        self.entries
            .lock()
            .iter()
            .map(|e| (e.name.clone(), e.message.clone()))
            .collect()
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl SwipeLog for MemoryLog {
    fn record(&self, entry: SwipeLogEntry) {
        self.entries.lock().push(entry);
    }
}

/// Forwards entries to two sinks.
pub struct TeeLog<A, B> {
    first: A,
    second: B,
}

impl<A: SwipeLog, B: SwipeLog> TeeLog<A, B> {
    /// Combines two sinks.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: SwipeLog, B: SwipeLog> SwipeLog for TeeLog<A, B> {
    fn record(&self, entry: SwipeLogEntry) {
        self.first.record(entry.clone());
        self.second.record(entry);
    }
}
