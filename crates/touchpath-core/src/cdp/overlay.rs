//! Finger trail drawn into the live page.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::page::CdpPage;
use super::probe::{append_overlay, remove_overlay};
use crate::layout::ElementTarget;
use crate::trail::{SvgCanvas, TrailMark, TrailSink};
use crate::transport::TransportError;

/// A [`TrailSink`] that mirrors an [`SvgCanvas`] into an overlay `<svg>` in
/// the target element's document.
///
/// Each event costs one `Runtime.evaluate` carrying only the shapes it
/// added and the new segments of each finger's line.
pub struct PageTrail {
    page: Arc<CdpPage>,
    target: ElementTarget,
    canvas: Mutex<SvgCanvas>,
}

impl PageTrail {
    /// Creates an empty trail for `target`.
    pub fn new(page: Arc<CdpPage>, target: ElementTarget) -> Self {
        Self {
            page,
            target,
            canvas: Mutex::new(SvgCanvas::new(0.0, 0.0)),
        }
    }

    /// A copy of what has been drawn so far.
    pub fn canvas(&self) -> SvgCanvas {
        self.canvas.lock().clone()
    }
}

#[async_trait]
impl TrailSink for PageTrail {
    async fn draw(&self, marks: &[TrailMark]) -> Result<(), TransportError> {
        let delta = self.canvas.lock().apply_batch(marks);
        if delta.is_empty() {
            return Ok(());
        }
        self.page
            .evaluate(&append_overlay(&self.target, &delta.markup, &delta.extensions))
            .await?;
        Ok(())
    }

    async fn teardown(&self) -> Result<(), TransportError> {
        self.page.evaluate(&remove_overlay(&self.target)).await?;
        Ok(())
    }
}
