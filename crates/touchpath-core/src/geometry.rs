//! Geometry primitives shared by the resolver, mapper and interpolator.
//!
//! All coordinates are CSS pixels with the origin at the top-left corner of
//! the rendering box they are relative to.

use serde::{Deserialize, Serialize};

/// A logical point, relative to the target element's own rendering box.
///
/// Values are not normalized: `(100.0, 50.0)` means 100px right and 50px
/// down from the element's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset in CSS pixels.
    pub x: f64,
    /// Vertical offset in CSS pixels.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns true if both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Linear blend between `self` and `other`: `self * (1 - t) + other * t`.
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x * (1.0 - t) + other.x * t,
            y: self.y * (1.0 - t) + other.y * t,
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// An axis-aligned rectangle (position and size).
///
/// Mirrors what `getBoundingClientRect()` reports for an element: the
/// position is relative to the viewport of the element's own document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// The x-coordinate of the top-left corner.
    pub x: f64,
    /// The y-coordinate of the top-left corner.
    pub y: f64,
    /// The rendered width.
    pub width: f64,
    /// The rendered height.
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// A uniform scale followed by a translation.
///
/// Maps a point in a nested rendering context into the outermost one:
/// `outer = offset + inner * scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Accumulated scale factor. Always greater than zero.
    pub scale: f64,
    /// Accumulated horizontal translation.
    pub offset_x: f64,
    /// Accumulated vertical translation.
    pub offset_y: f64,
}

impl Transform {
    /// The transform of the outermost context: no scale, no translation.
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    /// Applies the transform to a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.offset_x + x * self.scale, self.offset_y + y * self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Rounds half-way values toward positive infinity, like JavaScript's
/// `Math.round`.
///
/// `f64::round` rounds half away from zero, which differs for negative
/// half-way values (`-2.5` becomes `-3` instead of `-2`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_are_exact() {
        let a = Point::new(100.0, 100.0);
        let b = Point::new(100.0, 300.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), Point::new(100.0, 200.0));
    }

    #[test]
    fn point_display_uses_shortest_form() {
        assert_eq!(Point::new(100.0, 300.0).to_string(), "100, 300");
        assert_eq!(Point::new(150.5, -2.25).to_string(), "150.5, -2.25");
    }

    #[test]
    fn identity_transform_is_noop() {
        assert_eq!(Transform::IDENTITY.apply(12.0, 34.0), (12.0, 34.0));
        assert_eq!(Transform::default(), Transform::IDENTITY);
    }

    #[test]
    fn transform_scales_then_translates() {
        let t = Transform {
            scale: 2.0,
            offset_x: 10.0,
            offset_y: 20.0,
        };
        assert_eq!(t.apply(5.0, 5.0), (20.0, 30.0));
    }

    #[test]
    fn round_half_up_matches_js() {
        assert_eq!(round_half_up(82.5), 83.0);
        assert_eq!(round_half_up(83.333), 83.0);
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
    }

    #[test]
    fn point_deserializes_from_plain_json() {
        let p: Point = serde_json::from_str(r#"{"x": 1, "y": 2.5}"#).unwrap();
        assert_eq!(p, Point::new(1.0, 2.5));
    }
}
