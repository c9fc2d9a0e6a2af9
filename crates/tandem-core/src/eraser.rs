//! Eraser hit-testing.
//!
//! An erase pass removes every element the cursor disc touches. The test is
//! evaluated against every element (and every stroke point) on every sample,
//! so the cost of one pass is O(elements × points per stroke). That is fine
//! for interactive element counts; a spatial index would be the next step if
//! documents grow large.

use crate::elements::{Element, Image, Shape, ShapeKind, Stroke, Text, point_to_segment_dist};
use kurbo::Point;

/// Check whether an eraser disc of `radius` at `point` removes `element`.
pub fn is_erased(element: &Element, point: Point, radius: f64) -> bool {
    match element {
        Element::Stroke(stroke) => stroke_hit(stroke, point, radius),
        Element::Shape(shape) => shape_hit(shape, point, radius),
        Element::Text(text) => text_hit(text, point, radius),
        Element::Image(image) => image_hit(image, point, radius),
    }
}

/// Remove every element hit by the eraser disc. Returns how many were removed.
pub fn erase(elements: &mut Vec<Element>, point: Point, radius: f64) -> usize {
    let before = elements.len();
    elements.retain(|element| !is_erased(element, point, radius));
    before - elements.len()
}

fn stroke_hit(stroke: &Stroke, point: Point, radius: f64) -> bool {
    stroke.points.iter().any(|p| p.distance(point) <= radius)
}

fn shape_hit(shape: &Shape, point: Point, radius: f64) -> bool {
    match shape.kind {
        // Coarse: the inflated bounding box, not the outline.
        ShapeKind::Rectangle => {
            let rect = shape.rect().inflate(radius, radius);
            point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
        }
        ShapeKind::Ellipse => {
            let (center, rx, ry) = shape.ellipse_params();
            let (ax, ay) = (rx + radius, ry + radius);
            if ax <= f64::EPSILON || ay <= f64::EPSILON {
                return center.distance(point) <= radius;
            }
            let nx = (point.x - center.x) / ax;
            let ny = (point.y - center.y) / ay;
            nx * nx + ny * ny <= 1.0
        }
        ShapeKind::Line | ShapeKind::Arrow => {
            point_to_segment_dist(point, shape.start, shape.end) <= radius
        }
    }
}

fn text_hit(text: &Text, point: Point, radius: f64) -> bool {
    text.position.distance(point) <= radius
}

fn image_hit(image: &Image, point: Point, radius: f64) -> bool {
    image.position.distance(point) <= radius
}
