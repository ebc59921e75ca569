//! Gesture execution.
//!
//! The [`GestureController`] drives one gesture from touch-down to lift-off.
//! It validates the input, derives the [`GesturePlan`], then walks the plan
//! one event at a time: sleep the planned delay, dispatch the event, await
//! the transport. Nothing runs concurrently within a gesture.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use touchpath_core::cdp::{CdpClient, CdpPage};
//! use touchpath_core::controller::GestureController;
//! use touchpath_core::geometry::Point;
//! use touchpath_core::gesture::GestureConfig;
//! use touchpath_core::layout::ElementTarget;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CdpClient::connect("http://localhost:9222", None).await?;
//!     let page = Arc::new(CdpPage::new(Arc::new(client)));
//!     let controller = GestureController::new(page.clone(), page);
//!
//!     let report = controller
//!         .swipe(
//!             &ElementTarget::new("#pixi canvas"),
//!             vec![vec![Point::new(100.0, 100.0)], vec![Point::new(100.0, 300.0)]],
//!             &GestureConfig::default(),
//!         )
//!         .await?;
//!     println!("{} events in {:?}", report.events.len(), report.elapsed);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};

use crate::clock::{EventClock, NoopClock};
use crate::dispatch::EventDispatcher;
use crate::error::SwipeError;
use crate::geometry::Point;
use crate::gesture::{Gesture, GestureConfig, Timing};
use crate::interpolate::{plan, serialize_millis, GesturePlan};
use crate::layout::{ElementTarget, LayoutSource};
use crate::log::{SwipeLog, SwipeLogEntry, TracingLog};
use crate::trail::TrailSink;
use crate::transport::{TouchEventPayload, TouchTransport};

/// How long the trail stays visible after the final `touchEnd`.
pub const TRAIL_TEARDOWN_DELAY: Duration = Duration::from_millis(100);

/// Outcome of a completed gesture.
#[derive(Debug, Serialize)]
pub struct GestureReport {
    /// The timing the gesture ran with.
    pub timing: Timing,
    /// Every payload delivered to the transport, in order.
    pub events: Vec<TouchEventPayload>,
    /// Wall time from the first event to the last.
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    /// The scheduled trail teardown, if a trail was drawn.
    #[serde(skip)]
    pub teardown: Option<JoinHandle<()>>,
}

/// Runs gestures against one transport and layout source.
pub struct GestureController {
    transport: Arc<dyn TouchTransport>,
    layout: Arc<dyn LayoutSource>,
    log: Arc<dyn SwipeLog>,
    trail: Option<Arc<dyn TrailSink>>,
    clock: Arc<dyn EventClock>,
    cancel: Option<CancellationToken>,
}

impl GestureController {
    /// Creates a controller that logs through `tracing` and draws nothing.
    pub fn new(transport: Arc<dyn TouchTransport>, layout: Arc<dyn LayoutSource>) -> Self {
        Self {
            transport,
            layout,
            log: Arc::new(TracingLog),
            trail: None,
            clock: Arc::new(NoopClock),
            cancel: None,
        }
    }

    /// Replaces the log sink.
    pub fn with_log(mut self, log: Arc<dyn SwipeLog>) -> Self {
        self.log = log;
        self
    }

    /// Sets the sink that receives trail marks when a gesture has `draw`
    /// enabled.
    pub fn with_trail(mut self, trail: Arc<dyn TrailSink>) -> Self {
        self.trail = Some(trail);
        self
    }

    /// Shares a diagnostic clock across gestures.
    pub fn with_clock(mut self, clock: Arc<dyn EventClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Lets the host abort a running gesture between events.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validates raw checkpoints and runs them as a gesture.
    ///
    /// Malformed input fails with [`SwipeError::Gesture`] before anything is
    /// dispatched.
    pub async fn swipe(
        &self,
        target: &ElementTarget,
        checkpoints: Vec<Vec<Point>>,
        config: &GestureConfig,
    ) -> Result<GestureReport, SwipeError> {
        let gesture = Gesture::new(checkpoints)?;
        self.run(target, &gesture, config).await
    }

    /// Runs a validated gesture on `target`.
    ///
    /// Failures abort the gesture immediately. No compensating `touchEnd` is
    /// sent; the page may be left with fingers down.
    pub async fn run(
        &self,
        target: &ElementTarget,
        gesture: &Gesture,
        config: &GestureConfig,
    ) -> Result<GestureReport, SwipeError> {
        let span = info_span!(
            "swipe",
            element = %target,
            fingers = gesture.finger_count(),
            checkpoints = gesture.checkpoint_count(),
        );
        async {
            self.log.record(SwipeLogEntry::new(
                target.to_string(),
                "do swipe",
                gesture.describe(),
            ));
            let plan = plan(gesture, config)?;
            debug!(
                steps = plan.timing.steps,
                step_delay_ms = plan.timing.step_delay_ms,
                events = plan.events.len(),
                "gesture planned"
            );
            self.drive(target, plan, config.draw).await
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        target: &ElementTarget,
        plan: GesturePlan,
        draw: bool,
    ) -> Result<GestureReport, SwipeError> {
        let trail = if draw { self.trail.clone() } else { None };
        let dispatcher = EventDispatcher::new(self.transport.clone(), self.layout.clone(), target.clone())
            .with_log(self.log.clone())
            .with_trail(trail.clone())
            .with_clock(self.clock.clone());

        let mut events = Vec::with_capacity(plan.events.len());
        let mut started = None;
        for event in &plan.events {
            self.pause(event.delay_before, events.len()).await?;
            started.get_or_insert_with(Instant::now);
            let payload = dispatcher
                .dispatch(event.kind, &event.fingers, event.checkpoint)
                .await?;
            events.push(payload);
        }
        let elapsed = started.map(|s| s.elapsed()).unwrap_or_default();

        let teardown = trail.map(|trail| {
            tokio::spawn(async move {
                tokio::time::sleep(TRAIL_TEARDOWN_DELAY).await;
                if let Err(e) = trail.teardown().await {
                    warn!(error = %e, "failed to remove swipe trail");
                }
            })
        });

        Ok(GestureReport {
            timing: plan.timing,
            events,
            elapsed,
            teardown,
        })
    }

    async fn pause(&self, delay: Duration, dispatched: usize) -> Result<(), SwipeError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(SwipeError::Cancelled { dispatched }),
            Some(token) if !delay.is_zero() => {
                tokio::select! {
                    _ = token.cancelled() => Err(SwipeError::Cancelled { dispatched }),
                    _ = tokio::time::sleep(delay) => Ok(()),
                }
            }
            _ if !delay.is_zero() => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
