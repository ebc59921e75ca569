//! Path interpolation and the event plan of a gesture.
//!
//! [`plan`] expands a [`Gesture`] into the exact, ordered list of touch
//! events the controller will dispatch, together with the delay to wait
//! before each of them. The plan is pure data: it can be inspected, printed
//! or rendered without a browser.

use std::time::Duration;

use serde::Serialize;

use crate::geometry::Point;
use crate::gesture::{Gesture, GestureConfig, GestureError, Timing};
use crate::transport::TouchEventKind;

/// Interpolated finger positions at step `i` of `steps` between two
/// checkpoints.
///
/// Step 0 reproduces `from`, step `steps` reproduces `to`. Both slices must
/// have the same length; [`Gesture`] guarantees it.
pub fn interpolate(from: &[Point], to: &[Point], step: u32, steps: u32) -> Vec<Point> {
    let t = step as f64 / steps as f64;
    from.iter().zip(to).map(|(a, b)| a.lerp(b, t)).collect()
}

/// One event of a gesture plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedEvent {
    /// Event kind.
    pub kind: TouchEventKind,
    /// Logical position of every finger, by finger index.
    pub fingers: Vec<Point>,
    /// Whether this event sits exactly on a checkpoint.
    pub checkpoint: bool,
    /// Index of the checkpoint transition this event belongs to (1-based).
    pub transition: usize,
    /// Time to wait before dispatching this event.
    #[serde(rename = "delay_ms", serialize_with = "serialize_millis")]
    pub delay_before: Duration,
}

pub(crate) fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// The full event sequence of a gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GesturePlan {
    /// The derived timing.
    pub timing: Timing,
    /// Events in dispatch order.
    pub events: Vec<PlannedEvent>,
}

impl GesturePlan {
    /// Sum of all delays.
    pub fn total_delay(&self) -> Duration {
        self.events.iter().map(|e| e.delay_before).sum()
    }

    /// Number of events of the given kind.
    pub fn count(&self, kind: TouchEventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

/// Expands a gesture into its event plan.
///
/// For each transition k from checkpoint k-1 to k:
///
/// 1. a checkpoint event at the *from* positions, `touchStart` for k = 1 and
///    `touchMove` otherwise, with no delay;
/// 2. `steps - 1` interpolated `touchMove` events, each preceded by the step
///    delay;
/// 3. after the last transition only, the step delay and a `touchEnd` at the
///    *to* positions.
///
/// Fails with [`GestureError::TooManyEvents`] when the step count would
/// expand the gesture beyond [`crate::gesture::MAX_PLANNED_EVENTS`].
pub fn plan(gesture: &Gesture, config: &GestureConfig) -> Result<GesturePlan, GestureError> {
    let timing = gesture.timing(config)?;
    let step_delay = Duration::from_millis(timing.step_delay_ms);
    let last = gesture.checkpoint_count() - 1;
    let mut events = Vec::with_capacity(timing.event_count(gesture.checkpoint_count()) as usize);

    for (k, from, to) in gesture.transitions() {
        events.push(PlannedEvent {
            kind: if k == 1 {
                TouchEventKind::Start
            } else {
                TouchEventKind::Move
            },
            fingers: from.to_vec(),
            checkpoint: true,
            transition: k,
            delay_before: Duration::ZERO,
        });

        for step in 1..timing.steps {
            events.push(PlannedEvent {
                kind: TouchEventKind::Move,
                fingers: interpolate(from, to, step, timing.steps),
                checkpoint: false,
                transition: k,
                delay_before: step_delay,
            });
        }

        if k == last {
            events.push(PlannedEvent {
                kind: TouchEventKind::End,
                fingers: to.to_vec(),
                checkpoint: false,
                transition: k,
                delay_before: step_delay,
            });
        }
    }

    Ok(GesturePlan { timing, events })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_swipe() -> Gesture {
        Gesture::new(vec![
            vec![Point::new(100.0, 100.0)],
            vec![Point::new(100.0, 300.0)],
        ])
        .unwrap()
    }

    #[test]
    fn interpolation_is_exact_at_endpoints() {
        let from = [Point::new(100.0, 100.0), Point::new(300.0, 100.0)];
        let to = [Point::new(100.0, 300.0), Point::new(300.0, 300.0)];
        assert_eq!(interpolate(&from, &to, 0, 12), from.to_vec());
        assert_eq!(interpolate(&from, &to, 12, 12), to.to_vec());
    }

    #[test]
    fn interpolation_is_linear() {
        let from = [Point::new(0.0, 0.0)];
        let to = [Point::new(120.0, -60.0)];
        assert_eq!(interpolate(&from, &to, 3, 12), vec![Point::new(30.0, -15.0)]);
        assert_eq!(interpolate(&from, &to, 6, 12), vec![Point::new(60.0, -30.0)]);
    }

    #[test]
    fn single_finger_plan() {
        let plan = plan(&vertical_swipe(), &GestureConfig::default()).unwrap();
        assert_eq!(plan.timing, Timing { steps: 12, step_delay_ms: 83 });
        assert_eq!(plan.events.len(), 13);
        assert_eq!(plan.count(TouchEventKind::Start), 1);
        assert_eq!(plan.count(TouchEventKind::Move), 11);
        assert_eq!(plan.count(TouchEventKind::End), 1);

        let first = &plan.events[0];
        assert_eq!(first.kind, TouchEventKind::Start);
        assert_eq!(first.fingers, vec![Point::new(100.0, 100.0)]);
        assert!(first.checkpoint);
        assert_eq!(first.delay_before, Duration::ZERO);

        let last = plan.events.last().unwrap();
        assert_eq!(last.kind, TouchEventKind::End);
        assert_eq!(last.fingers, vec![Point::new(100.0, 300.0)]);
        assert!(!last.checkpoint);

        assert!(plan.events[1..]
            .iter()
            .all(|e| e.delay_before == Duration::from_millis(83)));
        assert_eq!(plan.total_delay(), Duration::from_millis(83 * 12));
    }

    #[test]
    fn intermediate_checkpoints_are_flagged_moves() {
        let gesture = Gesture::new(vec![
            vec![Point::new(100.0, 100.0), Point::new(300.0, 100.0)],
            vec![Point::new(100.0, 300.0), Point::new(300.0, 300.0)],
            vec![Point::new(150.0, 300.0), Point::new(350.0, 300.0)],
        ])
        .unwrap();
        let plan = plan(&gesture, &GestureConfig::default()).unwrap();

        // 6 steps per transition: (1 + 5) + (1 + 5) + end.
        assert_eq!(plan.events.len(), 13);
        let checkpoints: Vec<_> = plan
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.checkpoint)
            .map(|(i, e)| (i, e.kind, e.transition))
            .collect();
        assert_eq!(
            checkpoints,
            vec![(0, TouchEventKind::Start, 1), (6, TouchEventKind::Move, 2)]
        );
        assert_eq!(plan.events[6].fingers, gesture.checkpoints()[1]);
        assert_eq!(plan.events[6].delay_before, Duration::ZERO);
    }

    #[test]
    fn first_is_start_last_is_end_rest_are_moves() {
        let gesture = Gesture::new(vec![
            vec![Point::new(0.0, 0.0)],
            vec![Point::new(10.0, 0.0)],
            vec![Point::new(10.0, 10.0)],
            vec![Point::new(0.0, 10.0)],
        ])
        .unwrap();
        let plan = plan(&gesture, &GestureConfig::default().with_steps(3)).unwrap();
        let (first, rest) = plan.events.split_first().unwrap();
        let (last, middle) = rest.split_last().unwrap();
        assert_eq!(first.kind, TouchEventKind::Start);
        assert_eq!(last.kind, TouchEventKind::End);
        assert!(middle.iter().all(|e| e.kind == TouchEventKind::Move));
    }

    #[test]
    fn plan_serializes_delay_in_millis() {
        let plan = plan(&vertical_swipe(), &GestureConfig::default()).unwrap();
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["timing"]["steps"], 12);
        assert_eq!(value["events"][0]["kind"], "touchStart");
        assert_eq!(value["events"][1]["delay_ms"], 83);
    }

    #[test]
    fn oversized_plan_is_refused() {
        let err = plan(&vertical_swipe(), &GestureConfig::default().with_steps(u32::MAX)).unwrap_err();
        assert!(matches!(err, GestureError::TooManyEvents { .. }));
    }
}
