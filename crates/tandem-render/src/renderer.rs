//! Renderer trait abstraction and the display-list builder.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use peniko::Color;
use tandem_core::Element;
use tandem_core::camera::Viewport;
use tandem_core::canvas::Canvas;
use tandem_core::elements::{FontFamily, ImageRef, ShapeKind};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// One immediate-mode drawing operation.
///
/// Geometry is in canvas coordinates; the most recent [`DrawCommand::SetTransform`]
/// maps it to surface pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface, ignoring the transform.
    Clear(Color),
    SetTransform(Affine),
    Polyline {
        points: Vec<Point>,
        color: Color,
        width: f64,
    },
    Rect {
        rect: Rect,
        color: Color,
        width: f64,
    },
    Ellipse {
        center: Point,
        radii: Vec2,
        color: Color,
        width: f64,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f64,
    },
    Arrow {
        from: Point,
        to: Point,
        head: Option<[Point; 2]>,
        color: Color,
        width: f64,
    },
    /// Text run; `position` is the top-left of the first line.
    Text {
        position: Point,
        text: String,
        color: Color,
        font_size: f64,
        family: FontFamily,
    },
    Image {
        image_ref: ImageRef,
        rect: Rect,
    },
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Surface size in pixels.
    pub size: Size,
    /// Canvas-to-surface transform.
    pub transform: Affine,
    /// Background color.
    pub background_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Render `canvas` as seen through `viewport`, including its display rotation.
    pub fn new(canvas: &'a Canvas, viewport: &Viewport) -> Self {
        Self {
            canvas,
            size: viewport.size,
            transform: viewport.display_transform(&canvas.camera),
            background_color: Color::from_rgba8(0, 0, 0, 0),
        }
    }

    /// Render canvas space directly at scale 1, ignoring the camera.
    pub fn world(canvas: &'a Canvas, size: Size) -> Self {
        Self {
            canvas,
            size,
            transform: Affine::IDENTITY,
            background_color: Color::from_rgba8(0, 0, 0, 0),
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Full replay of the canvas: clear, transform, then every element back to front.
    pub fn display_list(&self) -> Vec<DrawCommand> {
        let elements = self.canvas.elements();
        let mut commands = Vec::with_capacity(elements.len() + 2);
        commands.push(DrawCommand::Clear(self.background_color));
        commands.push(DrawCommand::SetTransform(self.transform));
        commands.extend(elements.iter().map(element_command));
        commands
    }
}

/// Display list for `canvas` in `viewport`, over a transparent background.
pub fn build_display_list(canvas: &Canvas, viewport: &Viewport) -> Vec<DrawCommand> {
    RenderContext::new(canvas, viewport).display_list()
}

fn element_command(element: &Element) -> DrawCommand {
    match element {
        Element::Stroke(stroke) => DrawCommand::Polyline {
            points: stroke.points.clone(),
            color: stroke.color.into(),
            width: stroke.width,
        },
        Element::Shape(shape) => {
            let color: Color = shape.color.into();
            let width = shape.width;
            match shape.kind {
                ShapeKind::Rectangle => DrawCommand::Rect {
                    rect: shape.rect(),
                    color,
                    width,
                },
                ShapeKind::Ellipse => {
                    let (center, rx, ry) = shape.ellipse_params();
                    DrawCommand::Ellipse {
                        center,
                        radii: Vec2::new(rx, ry),
                        color,
                        width,
                    }
                }
                ShapeKind::Line => DrawCommand::Line {
                    from: shape.start,
                    to: shape.end,
                    color,
                    width,
                },
                ShapeKind::Arrow => DrawCommand::Arrow {
                    from: shape.start,
                    to: shape.end,
                    head: shape.arrow_head(),
                    color,
                    width,
                },
            }
        }
        Element::Text(text) => DrawCommand::Text {
            position: text.position,
            text: text.text.clone(),
            color: text.color.into(),
            font_size: text.font_size,
            family: text.font_family,
        },
        Element::Image(image) => DrawCommand::Image {
            image_ref: image.image_ref.clone(),
            rect: image.rect(),
        },
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Replay one frame for `ctx`. The surface is cleared and fully redrawn.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_core::tools::ToolKind;

    fn viewport() -> Viewport {
        Viewport::new(Point::ZERO, Size::new(800.0, 600.0))
    }

    #[test]
    fn test_empty_canvas_clears_and_sets_transform() {
        let canvas = Canvas::new();
        let commands = build_display_list(&canvas, &viewport());
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], DrawCommand::Clear(_)));
        assert_eq!(commands[1], DrawCommand::SetTransform(Affine::IDENTITY));
    }

    #[test]
    fn test_commands_follow_element_order() {
        let mut canvas = Canvas::new();
        canvas.start_drawing(Point::new(0.0, 0.0));
        canvas.continue_drawing(Point::new(5.0, 5.0));
        canvas.end_drawing();
        canvas.set_tool(ToolKind::Arrow);
        canvas.start_drawing(Point::new(0.0, 0.0));
        canvas.continue_drawing(Point::new(100.0, 0.0));
        canvas.end_drawing();
        canvas.insert_text(Point::new(3.0, 4.0), "hi");

        let commands = build_display_list(&canvas, &viewport());
        assert!(matches!(&commands[2], DrawCommand::Polyline { points, .. } if points.len() == 2));
        assert!(matches!(&commands[3], DrawCommand::Arrow { head: Some(_), .. }));
        assert!(matches!(&commands[4], DrawCommand::Text { text, .. } if text == "hi"));
    }

    #[test]
    fn test_rotated_viewport_uses_display_transform() {
        let canvas = Canvas::new();
        let rotated = viewport().rotated(true);
        let commands = build_display_list(&canvas, &rotated);
        match commands[1] {
            DrawCommand::SetTransform(t) => {
                let p = t * Point::new(0.0, 0.0);
                assert!((p.x - 800.0).abs() < 1e-9 && (p.y - 600.0).abs() < 1e-9);
            }
            ref other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_shape_kinds_map_to_primitives() {
        let mut canvas = Canvas::new();
        for tool in [ToolKind::Rectangle, ToolKind::Ellipse, ToolKind::Line] {
            canvas.set_tool(tool);
            canvas.start_drawing(Point::new(10.0, 10.0));
            canvas.continue_drawing(Point::new(30.0, 50.0));
            canvas.end_drawing();
        }
        let commands = RenderContext::world(&canvas, Size::new(64.0, 64.0)).display_list();
        assert!(matches!(commands[2], DrawCommand::Rect { rect, .. } if rect == Rect::new(10.0, 10.0, 30.0, 50.0)));
        assert!(matches!(
            commands[3],
            DrawCommand::Ellipse { center, radii, .. } if center == Point::new(20.0, 30.0) && radii == Vec2::new(10.0, 20.0)
        ));
        assert!(matches!(commands[4], DrawCommand::Line { .. }));
    }
}
