//! Frame-position resolution for nested rendering contexts.
//!
//! A target element may live inside any number of nested, possibly scaled
//! iframes. Touch events, however, are delivered to the outermost context.
//! This module walks the chain of hosting frames from the element's own
//! context up to the outermost one and composes their positions and scale
//! factors into a single [`Transform`].
//!
//! The page structure is abstracted behind [`BrowsingContexts`], so the
//! algorithm can be exercised with synthetic frame chains as easily as with a
//! snapshot taken from a live browser (see [`crate::layout::ContextTree`]).
//!
//! # Example
//!
//! ```
//! use touchpath_core::frame::{compose, FrameBox};
//! use touchpath_core::geometry::Rect;
//!
//! // Innermost first: a 1:1 frame at (5, 5) inside a frame scaled 2x at (10, 20).
//! let frames = vec![
//!     FrameBox::new(Rect::new(5.0, 5.0, 100.0, 100.0), 100.0),
//!     FrameBox::new(Rect::new(10.0, 20.0, 400.0, 300.0), 200.0),
//! ];
//! let t = compose(&frames).unwrap();
//! assert_eq!(t.scale, 2.0);
//! assert_eq!((t.offset_x, t.offset_y), (20.0, 30.0));
//! ```

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Rect, Transform};

/// Errors raised while resolving the position of a nested context.
///
/// All of them indicate a page structure that cannot be handled; none are
/// retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    /// The frame hosting a nested context could not be located, neither
    /// directly nor by searching the parent context.
    #[error("cannot find the frame hosting context '{context}' inside its parent '{parent}'")]
    FrameNotFound {
        /// The nested context whose frame is missing.
        context: String,
        /// The parent context that was searched.
        parent: String,
    },

    /// The outermost context (the one receiving raw input) has no anchor.
    #[error("cannot find the outermost rendering context; the page has no root anchor")]
    RootNotFound,

    /// A context id referenced by the snapshot does not exist.
    #[error("unknown rendering context '{0}'")]
    UnknownContext(String),

    /// A frame reports a non-positive layout width, which would produce a
    /// zero or negative scale factor.
    #[error("frame hosting context '{context}' has a degenerate layout width ({layout_width})")]
    DegenerateFrame {
        /// The nested context hosted by the frame.
        context: String,
        /// The reported layout width.
        layout_width: f64,
    },

    /// Walking up the parent links came back to a context already visited.
    #[error("rendering context '{0}' is its own ancestor")]
    ContextCycle(String),
}

/// The rendered box of a frame element inside its parent context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameBox {
    /// Rendered position and size in the parent context
    /// (`getBoundingClientRect()`).
    pub rect: Rect,
    /// The frame's own, untransformed layout width (`offsetWidth`).
    pub layout_width: f64,
}

impl FrameBox {
    /// Creates a frame box.
    pub const fn new(rect: Rect, layout_width: f64) -> Self {
        Self { rect, layout_width }
    }

    /// The scale this frame applies to its content.
    pub fn scale(&self) -> f64 {
        self.rect.width / self.layout_width
    }
}

/// A frame rendered inside a context, together with the identity of the
/// context it hosts. Used for the fallback lookup when a nested context
/// cannot reach its hosting frame directly (cross-origin restrictions).
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedFrame<Id> {
    /// Identity of the context rendered inside this frame.
    pub content: Id,
    /// The frame's box in the embedding context.
    pub frame: FrameBox,
}

/// The ownership chain of rendering contexts.
///
/// Given a context, implementors report its embedding parent and the frame
/// that hosts it. The outermost context has no parent.
pub trait BrowsingContexts {
    /// Identity of a rendering context.
    type Id: Clone + PartialEq + Debug;

    /// The context embedding `ctx`, or `None` if `ctx` is the outermost one.
    fn parent(&self, ctx: &Self::Id) -> Result<Option<Self::Id>, FrameError>;

    /// The frame hosting `ctx`, when it is directly reachable.
    fn frame_element(&self, ctx: &Self::Id) -> Option<FrameBox>;

    /// All frames rendered inside `ctx`.
    fn embedded_frames(&self, ctx: &Self::Id) -> Vec<EmbeddedFrame<Self::Id>>;

    /// The outermost context, if its anchor can be located.
    fn root(&self) -> Option<Self::Id>;
}

fn context_name<Id: Debug>(id: &Id) -> String {
    let name = format!("{:?}", id);
    name.trim_matches('"').to_string()
}

/// Collects the frames between `ctx` and the outermost context.
///
/// The result is ordered innermost first. An element already living in the
/// outermost context yields an empty chain. Parent links that loop back to
/// a visited context fail with [`FrameError::ContextCycle`].
pub fn frame_chain<C: BrowsingContexts + ?Sized>(
    contexts: &C,
    ctx: &C::Id,
) -> Result<Vec<FrameBox>, FrameError> {
    let mut frames = Vec::new();
    let mut current = ctx.clone();
    let mut visited = vec![ctx.clone()];

    while let Some(parent) = contexts.parent(&current)? {
        if visited.contains(&parent) {
            return Err(FrameError::ContextCycle(context_name(&parent)));
        }
        visited.push(parent.clone());
        let frame = match contexts.frame_element(&current) {
            Some(frame) => frame,
            None => contexts
                .embedded_frames(&parent)
                .into_iter()
                .find(|embedded| embedded.content == current)
                .map(|embedded| embedded.frame)
                .ok_or_else(|| FrameError::FrameNotFound {
                    context: context_name(&current),
                    parent: context_name(&parent),
                })?,
        };
        if !(frame.layout_width > 0.0) || !(frame.rect.width > 0.0) {
            return Err(FrameError::DegenerateFrame {
                context: context_name(&current),
                layout_width: frame.layout_width,
            });
        }
        frames.push(frame);
        current = parent;
    }

    Ok(frames)
}

/// Composes a frame chain (innermost first) into one transform.
///
/// Frames are folded from the outermost inwards: each frame's position is
/// scaled by everything outside it before being added to the offset, and its
/// own scale multiplies the accumulated one.
pub fn compose(frames: &[FrameBox]) -> Result<Transform, FrameError> {
    frames.iter().rev().try_fold(Transform::IDENTITY, |acc, frame| {
        if !(frame.layout_width > 0.0) || !(frame.rect.width > 0.0) {
            return Err(FrameError::DegenerateFrame {
                context: "<composed>".to_string(),
                layout_width: frame.layout_width,
            });
        }
        Ok(Transform {
            offset_x: acc.offset_x + frame.rect.x * acc.scale,
            offset_y: acc.offset_y + frame.rect.y * acc.scale,
            scale: acc.scale * frame.scale(),
        })
    })
}

/// Resolves the transform mapping `ctx`'s coordinates into the outermost
/// context.
pub fn resolve_transform<C: BrowsingContexts + ?Sized>(
    contexts: &C,
    ctx: &C::Id,
) -> Result<Transform, FrameError> {
    let frames = frame_chain(contexts, ctx)?;
    compose(&frames)
}
