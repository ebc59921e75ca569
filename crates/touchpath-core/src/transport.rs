//! Touch transport trait and the touch-event payload it carries.
//!
//! This module defines the [`TouchTransport`] trait, the seam between the
//! gesture engine and whatever delivers input to the browser engine. The
//! production implementation is [`CdpPage`](crate::cdp::CdpPage), which
//! forwards payloads to `Input.dispatchTouchEvent`; tests plug in recording
//! transports.
//!
//! # Wire shape
//!
//! [`TouchEventPayload`] serializes exactly as the CDP command parameters:
//!
//! ```
//! use touchpath_core::transport::{TouchEventKind, TouchEventPayload, TouchPoint};
//!
//! let payload = TouchEventPayload::new(
//!     TouchEventKind::Start,
//!     vec![TouchPoint { id: 0, x: 100, y: 100 }],
//! );
//! assert_eq!(
//!     serde_json::to_string(&payload).unwrap(),
//!     r#"{"type":"touchStart","touchPoints":[{"id":0,"x":100,"y":100}]}"#,
//! );
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to the browser.
///
/// This enum unifies errors from the WebSocket transport, the HTTP target
/// discovery and the page probe, so callers handle them uniformly.
#[derive(Error, Debug)]
pub enum TransportError {
    /// A command or operation failed with the given message.
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// The transport is not connected.
    #[error("Not connected to the browser")]
    NotConnected,

    /// The WebSocket connection was lost.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// No response arrived in time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The browser answered with a protocol-level error.
    #[error("CDP error: {message} (code: {code})")]
    Protocol {
        /// Protocol error code.
        code: i64,
        /// Protocol error message.
        message: String,
    },

    /// The target element does not exist in the page.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A probe script threw in the page.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Target discovery over HTTP failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The WebSocket layer reported an error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Failed to encode or decode JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        TransportError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Http(e.to_string())
    }
}

/// Kind of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TouchEventKind {
    /// First contact of all fingers.
    #[serde(rename = "touchStart")]
    Start,
    /// All fingers moved.
    #[serde(rename = "touchMove")]
    Move,
    /// All fingers lifted.
    #[serde(rename = "touchEnd")]
    End,
    /// The touch sequence was aborted.
    #[serde(rename = "touchCancel")]
    Cancel,
}

impl TouchEventKind {
    /// DOM event name (`touchstart`, `touchmove`, ...).
    pub fn event_name(&self) -> &'static str {
        match self {
            TouchEventKind::Start => "touchstart",
            TouchEventKind::Move => "touchmove",
            TouchEventKind::End => "touchend",
            TouchEventKind::Cancel => "touchcancel",
        }
    }

    /// Protocol `type` value (`touchStart`, `touchMove`, ...).
    pub fn protocol_type(&self) -> &'static str {
        match self {
            TouchEventKind::Start => "touchStart",
            TouchEventKind::Move => "touchMove",
            TouchEventKind::End => "touchEnd",
            TouchEventKind::Cancel => "touchCancel",
        }
    }
}

impl std::fmt::Display for TouchEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_name())
    }
}

/// One finger's absolute position within a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Stable finger id: the finger's index in the checkpoint arrays.
    pub id: u32,
    /// Device x-coordinate.
    pub x: i32,
    /// Device y-coordinate.
    pub y: i32,
}

/// All fingers of one touch event, delivered in a single protocol call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchEventPayload {
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: TouchEventKind,
    /// Every finger's position, ordered by finger id.
    pub touch_points: Vec<TouchPoint>,
}

impl TouchEventPayload {
    /// Creates a payload.
    pub fn new(kind: TouchEventKind, touch_points: Vec<TouchPoint>) -> Self {
        Self { kind, touch_points }
    }
}

/// Delivers touch events to the browser engine.
///
/// Implementations must deliver each payload as one atomic call: all fingers
/// of a step move together, as on real multi-touch hardware.
#[async_trait]
pub trait TouchTransport: Send + Sync {
    /// Delivers one touch event and waits until the browser acknowledged it.
    async fn dispatch_touch(&self, payload: &TouchEventPayload) -> Result<(), TransportError>;
}
