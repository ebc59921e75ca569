//! Layout snapshots of a target element and its frame chain.
//!
//! A [`LayoutSnapshot`] captures everything the coordinate mapper needs about
//! one element at one instant: its bounding box in its own document and the
//! tree of rendering contexts above it. Snapshots are produced by a
//! [`LayoutSource`] (the CDP page probe in production, static fixtures in
//! tests) and are re-taken for every touch event so that moving or resizing
//! elements are tracked during a gesture.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::frame::{BrowsingContexts, EmbeddedFrame, FrameBox, FrameError};
use crate::geometry::Rect;
use crate::transport::TransportError;

/// Identifies the element a gesture is performed on.
///
/// `selector` is a CSS selector evaluated in the innermost document;
/// `frames` lists CSS selectors of the iframes to descend through, outermost
/// first, to reach that document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementTarget {
    /// CSS selector of the target element.
    pub selector: String,
    /// CSS selectors of the iframes leading to the element's document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<String>,
}

impl ElementTarget {
    /// Targets an element of the top-level document.
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            frames: Vec::new(),
        }
    }

    /// Descends into one more iframe before evaluating the selector.
    pub fn within_frame(mut self, frame_selector: impl Into<String>) -> Self {
        self.frames.push(frame_selector.into());
        self
    }
}

impl std::fmt::Display for ElementTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for frame in &self.frames {
            write!(f, "{} >> ", frame)?;
        }
        write!(f, "{}", self.selector)
    }
}

/// A frame rendered inside a context, as reported by a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedFrameInfo {
    /// Id of the context rendered inside the frame.
    pub content: String,
    /// The frame's box in the embedding context.
    pub frame: FrameBox,
}

/// One rendering context (document) in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextNode {
    /// Unique id of this context within the snapshot.
    pub id: String,
    /// Id of the embedding context; `None` for the outermost one.
    #[serde(default)]
    pub parent: Option<String>,
    /// The hosting frame, when it was directly reachable.
    #[serde(default)]
    pub frame: Option<FrameBox>,
    /// Frames rendered inside this context.
    #[serde(default)]
    pub embedded: Vec<EmbeddedFrameInfo>,
}

/// A flat, id-indexed tree of rendering contexts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextTree {
    nodes: HashMap<String, ContextNode>,
    root: Option<String>,
}

impl ContextTree {
    /// Builds a tree from its nodes and the id of the anchored outermost
    /// context, if any.
    pub fn new(nodes: Vec<ContextNode>, root: Option<String>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            root,
        }
    }

    /// A tree containing only an anchored outermost context.
    pub fn top_level(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(
            vec![ContextNode {
                id: id.clone(),
                parent: None,
                frame: None,
                embedded: Vec::new(),
            }],
            Some(id),
        )
    }

    /// Looks up a context by id.
    pub fn get(&self, id: &str) -> Option<&ContextNode> {
        self.nodes.get(id)
    }

    /// Number of contexts in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no contexts.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl BrowsingContexts for ContextTree {
    type Id = String;

    fn parent(&self, ctx: &String) -> Result<Option<String>, FrameError> {
        self.nodes
            .get(ctx)
            .map(|node| node.parent.clone())
            .ok_or_else(|| FrameError::UnknownContext(ctx.clone()))
    }

    fn frame_element(&self, ctx: &String) -> Option<FrameBox> {
        self.nodes.get(ctx).and_then(|node| node.frame)
    }

    fn embedded_frames(&self, ctx: &String) -> Vec<EmbeddedFrame<String>> {
        self.nodes
            .get(ctx)
            .map(|node| {
                node.embedded
                    .iter()
                    .map(|e| EmbeddedFrame {
                        content: e.content.clone(),
                        frame: e.frame,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn root(&self) -> Option<String> {
        self.root.clone()
    }
}

/// Geometry of one element at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    /// Id of the context (document) owning the element.
    pub context: String,
    /// The element's bounding box in its own document.
    pub element: Rect,
    /// Every context between the element's document and the outermost one.
    pub contexts: Vec<ContextNode>,
    /// Id of the outermost context, when its anchor element was found.
    #[serde(default)]
    pub root: Option<String>,
}

impl LayoutSnapshot {
    /// Snapshot of an element living directly in the outermost context.
    pub fn top_level(element: Rect) -> Self {
        Self {
            context: "0".to_string(),
            element,
            contexts: vec![ContextNode {
                id: "0".to_string(),
                parent: None,
                frame: None,
                embedded: Vec::new(),
            }],
            root: Some("0".to_string()),
        }
    }

    /// The context tree described by this snapshot.
    pub fn context_tree(&self) -> ContextTree {
        ContextTree::new(self.contexts.clone(), self.root.clone())
    }
}

/// Source of layout snapshots for a target element.
#[async_trait]
pub trait LayoutSource: Send + Sync {
    /// Captures the current geometry of `target`.
    async fn snapshot(&self, target: &ElementTarget) -> Result<LayoutSnapshot, TransportError>;
}

/// A layout source returning the same snapshot every time.
///
/// Useful for dry runs and tests where the page is not live.
#[derive(Debug, Clone)]
pub struct StaticLayout {
    snapshot: LayoutSnapshot,
}

impl StaticLayout {
    /// Wraps a fixed snapshot.
    pub fn new(snapshot: LayoutSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl LayoutSource for StaticLayout {
    async fn snapshot(&self, _target: &ElementTarget) -> Result<LayoutSnapshot, TransportError> {
        Ok(self.snapshot.clone())
    }
}
