//! Top-level error type of a swipe.

use thiserror::Error;

use crate::frame::FrameError;
use crate::gesture::GestureError;
use crate::transport::TransportError;

/// Why a swipe was aborted.
///
/// Every variant is a non-recoverable abort of the current gesture. No
/// compensating `touchEnd`/`touchCancel` is sent; that is left to the caller.
#[derive(Error, Debug)]
pub enum SwipeError {
    /// The gesture input was malformed. Nothing was dispatched.
    #[error("invalid gesture: {0}")]
    Gesture(#[from] GestureError),

    /// The element's frame chain could not be resolved.
    #[error("frame resolution failed: {0}")]
    Frame(#[from] FrameError),

    /// The browser could not be reached or rejected a command.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The host cancelled the gesture.
    #[error("gesture cancelled after {dispatched} events")]
    Cancelled {
        /// Number of events delivered before cancellation.
        dispatched: usize,
    },
}

impl SwipeError {
    /// Returns true if the error was raised before any event was sent.
    pub fn is_input_error(&self) -> bool {
        matches!(self, SwipeError::Gesture(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_sources_with_context() {
        let err: SwipeError = GestureError::TooFewCheckpoints(1).into();
        assert!(err.is_input_error());
        assert_eq!(err.to_string(), "invalid gesture: a gesture needs at least 2 checkpoints, got 1");

        let err: SwipeError = FrameError::RootNotFound.into();
        assert!(!err.is_input_error());
        assert!(err.to_string().starts_with("frame resolution failed"));

        let err: SwipeError = TransportError::NotConnected.into();
        assert!(err.to_string().contains("Not connected"));

        let err = SwipeError::Cancelled { dispatched: 4 };
        assert_eq!(err.to_string(), "gesture cancelled after 4 events");
    }
}
