//! Finger-trail visualization.
//!
//! While a gesture runs, each finger leaves a polyline with a ring where it
//! touched down, small dots on every step, larger dots on checkpoints and a
//! ring where it lifted. [`SvgCanvas`] builds that drawing as SVG markup;
//! [`SvgTrail`] exposes it as a [`TrailSink`] for the dispatcher. The CDP
//! overlay in [`crate::cdp::PageTrail`] mirrors the same canvas into the
//! page.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::geometry::Point;
use crate::transport::TransportError;

/// Per-finger colours, cycling after the fifth finger.
pub const FINGER_COLORS: [&str; 5] = ["#00F", "#0CE", "#0E0", "#EA0", "#F00"];

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// One drawing instruction for one finger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrailMark {
    /// The finger touched down.
    Start {
        /// Finger index.
        finger: usize,
        /// Position in the element's document.
        point: Point,
    },
    /// The finger moved.
    Move {
        /// Finger index.
        finger: usize,
        /// Position in the element's document.
        point: Point,
        /// Whether the position is a checkpoint.
        checkpoint: bool,
    },
    /// The finger lifted.
    End {
        /// Finger index.
        finger: usize,
        /// Position in the element's document.
        point: Point,
    },
}

/// Receives trail marks while a gesture runs.
#[async_trait]
pub trait TrailSink: Send + Sync {
    /// Draws the marks of one event, one per finger.
    async fn draw(&self, marks: &[TrailMark]) -> Result<(), TransportError>;

    /// Removes the drawing. Called once, shortly after the gesture ended.
    async fn teardown(&self) -> Result<(), TransportError>;
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Circle {
        class: String,
        point: Point,
        radius: f64,
        color: &'static str,
        stroke: Option<f64>,
    },
    Line {
        finger: usize,
    },
}

/// What a batch of marks added to a canvas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailDelta {
    /// Markup of the shapes created by the batch, in drawing order.
    pub markup: String,
    /// Path data appended to finger lines that already existed, by finger.
    pub extensions: Vec<(usize, String)>,
}

impl TrailDelta {
    /// Returns true if the batch changed nothing.
    pub fn is_empty(&self) -> bool {
        self.markup.is_empty() && self.extensions.is_empty()
    }
}

/// In-memory SVG drawing of finger trails.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgCanvas {
    width: f64,
    height: f64,
    shapes: Vec<Shape>,
    lines: Vec<String>,
}

impl SvgCanvas {
    /// Creates an empty canvas of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
            lines: Vec::new(),
        }
    }

    fn color(finger: usize) -> &'static str {
        FINGER_COLORS[finger % FINGER_COLORS.len()]
    }

    fn dot(&mut self, class: String, point: Point, radius: f64, color: &'static str, stroke: Option<f64>) {
        self.shapes.push(Shape::Circle {
            class,
            point,
            radius,
            color,
            stroke,
        });
    }

    fn start_line(&mut self, finger: usize, point: Point) {
        if self.lines.len() <= finger {
            self.lines.resize(finger + 1, String::new());
        }
        self.lines[finger] = format!("M {},{}", point.x, point.y);
        self.shapes.push(Shape::Line { finger });
    }

    fn extend_line(&mut self, finger: usize, point: Point) {
        match self.lines.get_mut(finger) {
            Some(d) if !d.is_empty() => {
                let _ = write!(d, " L {},{}", point.x, point.y);
            }
            _ => self.start_line(finger, point),
        }
    }

    /// Applies one mark.
    pub fn apply(&mut self, mark: TrailMark) {
        match mark {
            TrailMark::Start { finger, point } => {
                self.dot(format!("start-{}", finger), point, 8.0, Self::color(finger), Some(3.0));
                self.start_line(finger, point);
            }
            TrailMark::Move {
                finger,
                point,
                checkpoint,
            } => {
                let (class, radius) = if checkpoint {
                    (format!("checkpoint-{}", finger), 4.0)
                } else {
                    (format!("move-{}", finger), 2.0)
                };
                self.dot(class, point, radius, Self::color(finger), None);
                self.extend_line(finger, point);
            }
            TrailMark::End { finger, point } => {
                self.dot(format!("end-{}", finger), point, 5.0, Self::color(finger), Some(3.0));
                self.extend_line(finger, point);
            }
        }
    }

    /// Applies a batch of marks and reports only what changed, so a mirror
    /// of the drawing can be updated without re-sending it.
    pub fn apply_batch(&mut self, marks: &[TrailMark]) -> TrailDelta {
        let first_new = self.shapes.len();
        let line_lengths: Vec<usize> = self.lines.iter().map(String::len).collect();

        for &mark in marks {
            self.apply(mark);
        }

        let new_shapes = &self.shapes[first_new..];
        let mut markup = String::new();
        for shape in new_shapes {
            self.render_shape(shape, &mut markup);
        }

        let extensions = line_lengths
            .iter()
            .enumerate()
            .filter(|(finger, _)| {
                !new_shapes
                    .iter()
                    .any(|s| matches!(s, Shape::Line { finger: f } if f == finger))
            })
            .filter_map(|(finger, &before)| {
                let d = &self.lines[finger];
                (d.len() > before).then(|| (finger, d[before..].to_string()))
            })
            .collect();

        TrailDelta { markup, extensions }
    }

    /// Number of dots drawn so far.
    pub fn dot_count(&self) -> usize {
        self.shapes
            .iter()
            .filter(|s| matches!(s, Shape::Circle { .. }))
            .count()
    }

    /// Path data of one finger's polyline.
    pub fn line(&self, finger: usize) -> Option<&str> {
        self.lines.get(finger).map(String::as_str).filter(|d| !d.is_empty())
    }

    /// Inner markup (everything inside the `<svg>` element).
    pub fn render_inner(&self) -> String {
        let mut out = String::new();
        for shape in &self.shapes {
            self.render_shape(shape, &mut out);
        }
        out
    }

    fn render_shape(&self, shape: &Shape, out: &mut String) {
        match shape {
            Shape::Line { finger } => {
                let _ = write!(
                    out,
                    r##"<path class="line-{finger}" fill="transparent" stroke="#FFF" stroke-width="6" stroke-linecap="round" stroke-linejoin="round" opacity="0.5" d="{d}"/>"##,
                    d = self.lines[*finger],
                );
            }
            Shape::Circle {
                class,
                point,
                radius,
                color,
                stroke: Some(stroke),
            } => {
                let _ = write!(
                    out,
                    r##"<circle cx="{x}" cy="{y}" r="{r}" opacity="0.5" fill="transparent" stroke="#FFF" stroke-width="{border}"/>"##,
                    x = point.x,
                    y = point.y,
                    r = radius,
                    border = stroke + 4.0,
                );
                let _ = write!(
                    out,
                    r#"<circle cx="{x}" cy="{y}" r="{r}" class="{class}" fill="transparent" stroke="{color}" stroke-width="{stroke}" opacity="0.6"/>"#,
                    x = point.x,
                    y = point.y,
                    r = radius,
                );
            }
            Shape::Circle {
                class,
                point,
                radius,
                color,
                stroke: None,
            } => {
                let _ = write!(
                    out,
                    r#"<circle cx="{x}" cy="{y}" r="{r}" class="{class}" fill="{color}" opacity="0.6"/>"#,
                    x = point.x,
                    y = point.y,
                    r = radius,
                );
            }
        }
    }

    /// A standalone SVG document.
    pub fn render(&self) -> String {
        format!(
            r#"<svg xmlns="{ns}" width="{w}" height="{h}" style="position:absolute;top:0;left:0;z-index:99999999;pointer-events:none">{inner}</svg>"#,
            ns = SVG_NS,
            w = self.width,
            h = self.height,
            inner = self.render_inner(),
        )
    }
}

/// A [`TrailSink`] drawing into an in-memory [`SvgCanvas`].
///
/// Clones share the same canvas, so the drawing can be rendered after the
/// gesture finished.
#[derive(Debug, Clone)]
pub struct SvgTrail {
    canvas: Arc<Mutex<SvgCanvas>>,
}

impl SvgTrail {
    /// Creates an empty trail of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            canvas: Arc::new(Mutex::new(SvgCanvas::new(width, height))),
        }
    }

    /// A copy of the current canvas.
    pub fn canvas(&self) -> SvgCanvas {
        self.canvas.lock().clone()
    }

    /// Renders the current drawing as an SVG document.
    pub fn render(&self) -> String {
        self.canvas.lock().render()
    }
}

#[async_trait]
impl TrailSink for SvgTrail {
    async fn draw(&self, marks: &[TrailMark]) -> Result<(), TransportError> {
        let mut canvas = self.canvas.lock();
        for &mark in marks {
            canvas.apply(mark);
        }
        Ok(())
    }

    async fn teardown(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
