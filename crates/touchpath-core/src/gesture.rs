//! Gesture input: checkpoints, configuration and step timing.
//!
//! A [`Gesture`] is a list of checkpoints, each holding one [`Point`] per
//! finger. Checkpoint 0 is where the fingers touch down, the last one is
//! where they lift, and any in between are waypoints the fingers pass
//! through.
//!
//! # Example
//!
//! ```
//! use touchpath_core::geometry::Point;
//! use touchpath_core::gesture::{Gesture, GestureConfig, Timing};
//!
//! let gesture = Gesture::new(vec![
//!     vec![Point::new(100.0, 100.0)],
//!     vec![Point::new(100.0, 300.0)],
//! ]).unwrap();
//!
//! let timing = Timing::derive(gesture.checkpoint_count(), &GestureConfig::default());
//! assert_eq!(timing.steps, 12);
//! assert_eq!(timing.step_delay_ms, 83);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{round_half_up, Point};

/// Total number of interpolation steps spread over all transitions when the
/// caller does not pick a step count.
pub const AUTO_STEP_BUDGET: f64 = 12.0;

/// Lower bound for the automatically derived step count.
pub const MIN_AUTO_STEPS: u32 = 2;

/// Per-step delays above this many milliseconds look unnaturally slow; the
/// step count is doubled once when it is exceeded.
pub const MAX_NATURAL_STEP_DELAY_MS: u64 = 150;

/// Upper bound on the number of events one gesture may expand to.
pub const MAX_PLANNED_EVENTS: u64 = 100_000;

/// Default total duration of a gesture in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Errors for malformed gesture input.
///
/// Raised before any event is dispatched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GestureError {
    /// A gesture needs a start and an end.
    #[error("a gesture needs at least 2 checkpoints, got {0}")]
    TooFewCheckpoints(usize),

    /// Checkpoints must carry at least one finger.
    #[error("checkpoint 0 has no fingers")]
    NoFingers,

    /// Every checkpoint must carry the same number of fingers.
    #[error("checkpoint {checkpoint} has {found} fingers, expected {expected}")]
    FingerCountMismatch {
        /// Index of the offending checkpoint.
        checkpoint: usize,
        /// Finger count of checkpoint 0.
        expected: usize,
        /// Finger count of the offending checkpoint.
        found: usize,
    },

    /// Coordinates must be finite numbers.
    #[error("finger {finger} of checkpoint {checkpoint} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the offending checkpoint.
        checkpoint: usize,
        /// Index of the offending finger.
        finger: usize,
    },

    /// The step count expands the gesture into more events than allowed.
    #[error("gesture would dispatch {events} events, more than the limit of {max}")]
    TooManyEvents {
        /// Events the gesture would expand to.
        events: u64,
        /// The limit, [`MAX_PLANNED_EVENTS`].
        max: u64,
    },
}

/// Configuration of one swipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Total duration of the gesture in milliseconds.
    #[serde(default = "default_delay_ms", alias = "delay")]
    pub delay_ms: u64,

    /// Interpolation steps per checkpoint transition. `None` (or `0`)
    /// derives it from the checkpoint count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,

    /// Whether to draw the finger trail while the gesture runs.
    #[serde(default = "default_draw")]
    pub draw: bool,
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_draw() -> bool {
    true
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            steps: None,
            draw: true,
        }
    }
}

impl GestureConfig {
    /// Sets the total duration.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Sets an explicit step count.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Enables or disables the trail.
    pub fn with_draw(mut self, draw: bool) -> Self {
        self.draw = draw;
        self
    }
}

/// Step count and per-step delay of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timing {
    /// Steps per checkpoint transition; `steps - 1` positions are
    /// interpolated between two checkpoints.
    pub steps: u32,
    /// Delay before each interpolated step, in milliseconds.
    pub step_delay_ms: u64,
}

impl Timing {
    /// Derives the timing for `checkpoint_count` checkpoints.
    ///
    /// When the derived per-step delay exceeds
    /// [`MAX_NATURAL_STEP_DELAY_MS`], the step count is doubled and the delay
    /// recomputed exactly once, even if the new delay is still above the
    /// threshold.
    ///
    /// `checkpoint_count` must be at least 2; [`Gesture::new`] guarantees it.
    pub fn derive(checkpoint_count: usize, config: &GestureConfig) -> Self {
        let transitions = checkpoint_count.saturating_sub(1).max(1) as f64;

        let mut steps = match config.steps {
            Some(steps) if steps > 0 => steps,
            _ => (round_half_up(AUTO_STEP_BUDGET / transitions) as u32).max(MIN_AUTO_STEPS),
        };
        let step_delay = |steps: u32| -> u64 {
            round_half_up(config.delay_ms as f64 / (steps as f64 * transitions)) as u64
        };

        let mut step_delay_ms = step_delay(steps);
        if step_delay_ms > MAX_NATURAL_STEP_DELAY_MS {
            steps = steps.saturating_mul(2);
            step_delay_ms = step_delay(steps);
        }

        Self {
            steps,
            step_delay_ms,
        }
    }

    /// Number of events a gesture with `checkpoint_count` checkpoints
    /// expands to: `steps` per transition plus the final `touchEnd`.
    pub fn event_count(&self, checkpoint_count: usize) -> u64 {
        (checkpoint_count.saturating_sub(1) as u64)
            .saturating_mul(self.steps as u64)
            .saturating_add(1)
    }
}

/// A validated multi-finger gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gesture {
    checkpoints: Vec<Vec<Point>>,
}

impl Gesture {
    /// Validates and wraps a list of checkpoints.
    ///
    /// Rejects fewer than two checkpoints, empty checkpoints, checkpoints
    /// whose finger count differs from checkpoint 0, and non-finite
    /// coordinates.
    pub fn new(checkpoints: Vec<Vec<Point>>) -> Result<Self, GestureError> {
        if checkpoints.len() < 2 {
            return Err(GestureError::TooFewCheckpoints(checkpoints.len()));
        }
        let expected = checkpoints[0].len();
        if expected == 0 {
            return Err(GestureError::NoFingers);
        }
        for (checkpoint, fingers) in checkpoints.iter().enumerate() {
            if fingers.len() != expected {
                return Err(GestureError::FingerCountMismatch {
                    checkpoint,
                    expected,
                    found: fingers.len(),
                });
            }
            if let Some(finger) = fingers.iter().position(|p| !p.is_finite()) {
                return Err(GestureError::NonFiniteCoordinate { checkpoint, finger });
            }
        }
        Ok(Self { checkpoints })
    }

    /// Number of checkpoints (at least 2).
    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    /// Number of fingers (at least 1).
    pub fn finger_count(&self) -> usize {
        self.checkpoints[0].len()
    }

    /// All checkpoints, in order.
    pub fn checkpoints(&self) -> &[Vec<Point>] {
        &self.checkpoints
    }

    /// One finger's positions across all checkpoints.
    pub fn finger_path(&self, finger: usize) -> Option<Vec<Point>> {
        if finger >= self.finger_count() {
            return None;
        }
        Some(self.checkpoints.iter().map(|c| c[finger]).collect())
    }

    /// Derives the timing of this gesture, rejecting step counts that would
    /// expand it beyond [`MAX_PLANNED_EVENTS`].
    pub fn timing(&self, config: &GestureConfig) -> Result<Timing, GestureError> {
        let timing = Timing::derive(self.checkpoint_count(), config);
        let events = timing.event_count(self.checkpoint_count());
        if events > MAX_PLANNED_EVENTS {
            return Err(GestureError::TooManyEvents {
                events,
                max: MAX_PLANNED_EVENTS,
            });
        }
        Ok(timing)
    }

    /// Consecutive checkpoint pairs: `(k, from, to)` for k = 1..N-1.
    pub fn transitions(&self) -> impl Iterator<Item = (usize, &[Point], &[Point])> {
        self.checkpoints
            .windows(2)
            .enumerate()
            .map(|(i, pair)| (i + 1, pair[0].as_slice(), pair[1].as_slice()))
    }

    /// Human-readable path summary, e.g. `[x:100,y:100]->[x:100,y:300]`.
    pub fn describe(&self) -> String {
        self.checkpoints
            .iter()
            .map(|fingers| {
                fingers
                    .iter()
                    .map(|p| format!("[x:{},y:{}]", p.x, p.y))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join("->")
    }
}
