//! Mapping of element-relative points to absolute device coordinates.

use serde::Serialize;

use crate::frame::{resolve_transform, BrowsingContexts, FrameError};
use crate::geometry::{round_half_up, Point, Rect, Transform};
use crate::layout::LayoutSnapshot;

/// An absolute, integral point in the outermost context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MappedPoint {
    /// Device x-coordinate.
    pub x: i32,
    /// Device y-coordinate.
    pub y: i32,
    /// Effective scale between the element's pixels and device pixels.
    pub scale: f64,
}

/// Maps logical points on one element into outermost-context coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    bounds: Rect,
    transform: Transform,
}

impl CoordinateMapper {
    /// Creates a mapper from an element's local bounds and its context's
    /// transform.
    pub fn new(bounds: Rect, transform: Transform) -> Self {
        Self { bounds, transform }
    }

    /// Builds a mapper for the element described by `snapshot`.
    ///
    /// Fails with [`FrameError::RootNotFound`] if the outermost context has no
    /// anchor, or with any frame-resolution error raised while walking the
    /// element's frame chain.
    pub fn from_snapshot(snapshot: &LayoutSnapshot) -> Result<Self, FrameError> {
        let tree = snapshot.context_tree();
        if tree.root().is_none() {
            return Err(FrameError::RootNotFound);
        }
        let transform = resolve_transform(&tree, &snapshot.context)?;
        Ok(Self::new(snapshot.element, transform))
    }

    /// The resolved frame transform.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// The element's rectangle in outermost-context coordinates.
    pub fn absolute_bounds(&self) -> Rect {
        let (x, y) = self.transform.apply(self.bounds.x, self.bounds.y);
        Rect {
            x,
            y,
            width: self.bounds.width * self.transform.scale,
            height: self.bounds.height * self.transform.scale,
        }
    }

    /// Maps a point relative to the element's top-left corner.
    pub fn map(&self, point: Point) -> MappedPoint {
        let origin = self.absolute_bounds();
        let scale = self.transform.scale;
        MappedPoint {
            x: round_half_up(origin.x + point.x * scale) as i32,
            y: round_half_up(origin.y + point.y * scale) as i32,
            scale,
        }
    }
}
