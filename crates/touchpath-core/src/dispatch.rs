//! Touch event dispatch.
//!
//! The [`EventDispatcher`] turns one set of logical finger positions into one
//! [`TouchEventPayload`]: it snapshots the target's layout, maps every finger
//! to device coordinates, logs checkpoint positions, forwards trail marks and
//! finally hands the payload to the [`TouchTransport`] as a single call.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::clock::{EventClock, NoopClock};
use crate::error::SwipeError;
use crate::geometry::Point;
use crate::layout::{ElementTarget, LayoutSource};
use crate::log::{SwipeLog, SwipeLogEntry, TracingLog};
use crate::mapper::CoordinateMapper;
use crate::trail::{TrailMark, TrailSink};
use crate::transport::{TouchEventKind, TouchEventPayload, TouchPoint, TouchTransport};

/// Log name of an event for one finger.
///
/// `swipe start`, `swipe end` and `swipe checkpoint` (for moves), suffixed
/// with the finger index when the gesture uses more than one finger.
pub fn log_name(kind: TouchEventKind, finger: usize, finger_count: usize) -> String {
    let base = match kind {
        TouchEventKind::Start => "swipe start",
        TouchEventKind::End => "swipe end",
        TouchEventKind::Move => "swipe checkpoint",
        TouchEventKind::Cancel => "swipe cancel",
    };
    if finger_count == 1 {
        base.to_string()
    } else {
        format!("{} {}", base, finger)
    }
}

/// Delivers touch events for one target element.
pub struct EventDispatcher {
    transport: Arc<dyn TouchTransport>,
    layout: Arc<dyn LayoutSource>,
    target: ElementTarget,
    log: Arc<dyn SwipeLog>,
    trail: Option<Arc<dyn TrailSink>>,
    clock: Arc<dyn EventClock>,
}

impl EventDispatcher {
    /// Creates a dispatcher logging through `tracing`, without trail and
    /// without a diagnostic clock.
    pub fn new(
        transport: Arc<dyn TouchTransport>,
        layout: Arc<dyn LayoutSource>,
        target: ElementTarget,
    ) -> Self {
        Self {
            transport,
            layout,
            target,
            log: Arc::new(TracingLog),
            trail: None,
            clock: Arc::new(NoopClock),
        }
    }

    /// Replaces the log sink.
    pub fn with_log(mut self, log: Arc<dyn SwipeLog>) -> Self {
        self.log = log;
        self
    }

    /// Sets the trail sink.
    pub fn with_trail(mut self, trail: Option<Arc<dyn TrailSink>>) -> Self {
        self.trail = trail;
        self
    }

    /// Sets the shared diagnostic clock.
    pub fn with_clock(mut self, clock: Arc<dyn EventClock>) -> Self {
        self.clock = clock;
        self
    }

    /// The target element.
    pub fn target(&self) -> &ElementTarget {
        &self.target
    }

    /// The log sink.
    pub fn log(&self) -> &Arc<dyn SwipeLog> {
        &self.log
    }

    /// The trail sink, if drawing.
    pub fn trail(&self) -> Option<&Arc<dyn TrailSink>> {
        self.trail.as_ref()
    }

    /// Dispatches one event with every finger's logical position.
    ///
    /// Finger ids are the indices into `fingers`. Positions are logged when
    /// `checkpoint` is set or the event is a `touchEnd`. Trail failures are
    /// logged and ignored; layout and transport failures abort.
    pub async fn dispatch(
        &self,
        kind: TouchEventKind,
        fingers: &[Point],
        checkpoint: bool,
    ) -> Result<TouchEventPayload, SwipeError> {
        let snapshot = self.layout.snapshot(&self.target).await?;
        let mapper = CoordinateMapper::from_snapshot(&snapshot)?;

        let touch_points = fingers
            .iter()
            .enumerate()
            .map(|(id, &point)| {
                let mapped = mapper.map(point);
                TouchPoint {
                    id: id as u32,
                    x: mapped.x,
                    y: mapped.y,
                }
            })
            .collect();

        if checkpoint || kind == TouchEventKind::End {
            for (finger, point) in fingers.iter().enumerate() {
                self.log.record(SwipeLogEntry::new(
                    self.target.to_string(),
                    log_name(kind, finger, fingers.len()),
                    point.to_string(),
                ));
            }
        }

        if let Some(trail) = &self.trail {
            let marks: Vec<TrailMark> = fingers
                .iter()
                .enumerate()
                .filter_map(|(finger, p)| {
                    let point = Point::new(snapshot.element.x + p.x, snapshot.element.y + p.y);
                    match kind {
                        TouchEventKind::Start => Some(TrailMark::Start { finger, point }),
                        TouchEventKind::Move => Some(TrailMark::Move { finger, point, checkpoint }),
                        TouchEventKind::End => Some(TrailMark::End { finger, point }),
                        TouchEventKind::Cancel => None,
                    }
                })
                .collect();
            if !marks.is_empty() {
                if let Err(e) = trail.draw(&marks).await {
                    warn!(error = %e, "failed to draw trail marks");
                }
            }
        }

        let payload = TouchEventPayload::new(kind, touch_points);
        let elapsed_ms = self.clock.mark().map(|d| d.as_millis() as u64);
        trace!(kind = %kind, ?elapsed_ms, points = payload.touch_points.len(), "dispatching touch event");
        self.transport.dispatch_touch(&payload).await?;
        Ok(payload)
    }
}
