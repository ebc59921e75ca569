//! Diagnostic clock shared across gestures.
//!
//! The dispatcher marks the clock before every touch event to report how
//! much time has passed since the first event of the run. The value is for
//! logs only; nothing in the gesture depends on it.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Elapsed-time bookkeeping across a test run.
pub trait EventClock: Send + Sync {
    /// Records an event and returns the time elapsed since the first one,
    /// if the clock keeps time.
    fn mark(&self) -> Option<Duration>;
}

/// A clock that keeps no time.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClock;

impl EventClock for NoopClock {
    fn mark(&self) -> Option<Duration> {
        None
    }
}

/// Measures time from the first marked event.
///
/// Uses tokio's clock so that paused-time tests see deterministic values.
#[derive(Debug, Default)]
pub struct RunClock {
    first: Mutex<Option<Instant>>,
}

impl RunClock {
    /// Creates a clock that starts at its first mark.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventClock for RunClock {
    fn mark(&self) -> Option<Duration> {
        let now = Instant::now();
        let mut first = self.first.lock();
        let start = *first.get_or_insert(now);
        Some(now.duration_since(start))
    }
}
