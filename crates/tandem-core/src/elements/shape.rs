//! Two-point parametric shapes: rectangle, ellipse, line and arrow.

use super::{ElementId, ElementTrait, SerializableColor};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which primitive a [`Shape`] draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Line,
    Arrow,
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line => "line",
            ShapeKind::Arrow => "arrow",
        }
    }
}

/// A shape anchored by two corners.
///
/// `start` is fixed at creation; `end` follows the pointer while drawing.
/// The corners are stored as drawn and normalized on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub(crate) id: ElementId,
    pub kind: ShapeKind,
    pub start: Point,
    pub end: Point,
    pub color: SerializableColor,
    pub width: f64,
}

impl Shape {
    /// Arrowhead length in canvas units.
    pub const ARROW_HEAD_SIZE: f64 = 15.0;

    /// Create a zero-size shape at `point`.
    pub fn new(kind: ShapeKind, point: Point, color: SerializableColor, width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            start: point,
            end: point,
            color,
            width,
        }
    }

    /// Move the free corner.
    pub fn set_end(&mut self, point: Point) {
        self.end = point;
    }

    /// Normalized rectangle spanned by the two corners.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    /// Center and semi-axes of the inscribed ellipse.
    pub fn ellipse_params(&self) -> (Point, f64, f64) {
        let rect = self.rect();
        (rect.center(), rect.width() / 2.0, rect.height() / 2.0)
    }

    /// The two barb endpoints of the arrowhead at `end`, or `None` for a zero-length arrow.
    pub fn arrow_head(&self) -> Option<[Point; 2]> {
        let dir = self.end - self.start;
        let len = dir.hypot();
        if len < f64::EPSILON {
            return None;
        }
        let dir = dir / len;
        let perp = Vec2::new(-dir.y, dir.x);
        let size = Self::ARROW_HEAD_SIZE.min(len);
        let back = self.end - dir * size;
        Some([back + perp * (size * 0.5), back - perp * (size * 0.5)])
    }
}

impl ElementTrait for Shape {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let mut rect = self.rect();
        if let (ShapeKind::Arrow, Some(head)) = (self.kind, self.arrow_head()) {
            rect = rect.union_pt(head[0]).union_pt(head[1]);
        }
        let half = self.width / 2.0;
        rect.inflate(half, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let mut shape = Shape::new(ShapeKind::Rectangle, Point::new(100.0, 100.0), SerializableColor::black(), 1.0);
        shape.set_end(Point::new(50.0, 40.0));
        let rect = shape.rect();
        assert!((rect.x0 - 50.0).abs() < f64::EPSILON);
        assert!((rect.y0 - 40.0).abs() < f64::EPSILON);
        assert!((rect.width() - 50.0).abs() < f64::EPSILON);
        assert!((rect.height() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ellipse_params() {
        let mut shape = Shape::new(ShapeKind::Ellipse, Point::new(0.0, 0.0), SerializableColor::black(), 1.0);
        shape.set_end(Point::new(40.0, 20.0));
        let (center, rx, ry) = shape.ellipse_params();
        assert_eq!(center, Point::new(20.0, 10.0));
        assert!((rx - 20.0).abs() < f64::EPSILON);
        assert!((ry - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_arrow_head_points_back_from_end() {
        let mut shape = Shape::new(ShapeKind::Arrow, Point::new(0.0, 0.0), SerializableColor::black(), 1.0);
        shape.set_end(Point::new(100.0, 0.0));
        let [left, right] = shape.arrow_head().unwrap();
        assert!((left.x - 85.0).abs() < 1e-10);
        assert!((right.x - 85.0).abs() < 1e-10);
        assert!((left.y - 7.5).abs() < 1e-10);
        assert!((right.y + 7.5).abs() < 1e-10);
    }

    #[test]
    fn test_zero_length_arrow_has_no_head() {
        let shape = Shape::new(ShapeKind::Arrow, Point::new(5.0, 5.0), SerializableColor::black(), 1.0);
        assert!(shape.arrow_head().is_none());
    }
}
