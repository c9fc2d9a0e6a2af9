//! CPU rasterizer replaying display lists onto an RGBA8 surface.

use crate::renderer::{DrawCommand, RenderContext, RenderResult, Renderer, RendererError};
use ab_glyph::{Font, FontArc, ScaleFont, point};
use image::{Rgba, RgbaImage};
use kurbo::{Affine, BezPath, Ellipse, PathEl, Point, Rect, Shape as _, Vec2};
use peniko::Color;
use tandem_core::decode::{DecodedImage, ImageStore};
use tandem_core::elements::point_to_segment_dist;

/// Curve flattening tolerance in surface pixels.
const FLATTEN_TOLERANCE: f64 = 0.25;
/// Line height as a multiple of the font size.
const LINE_HEIGHT: f64 = 1.2;

/// Software renderer writing into an [`RgbaImage`].
///
/// Colors are blended source-over in straight (non-premultiplied) alpha.
pub struct RasterRenderer {
    surface: RgbaImage,
    transform: Affine,
    font: Option<FontArc>,
}

impl RasterRenderer {
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RendererError::InvalidSize { width, height });
        }
        Ok(Self {
            surface: RgbaImage::new(width, height),
            transform: Affine::IDENTITY,
            font: None,
        })
    }

    /// Use `font` for text runs. Without a font, text is skipped.
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Parse a TrueType/OpenType font for text runs.
    pub fn load_font(bytes: Vec<u8>) -> RenderResult<FontArc> {
        FontArc::try_from_vec(bytes).map_err(|e| RendererError::Font(e.to_string()))
    }

    /// Reallocate the surface. Contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RendererError::InvalidSize { width, height });
        }
        if self.surface.dimensions() != (width, height) {
            self.surface = RgbaImage::new(width, height);
        }
        Ok(())
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn into_surface(self) -> RgbaImage {
        self.surface
    }

    /// Replay `commands`, resolving image blits against `images`.
    pub fn execute(&mut self, commands: &[DrawCommand], images: &ImageStore) {
        for command in commands {
            match command {
                DrawCommand::Clear(color) => self.clear(*color),
                DrawCommand::SetTransform(transform) => self.transform = *transform,
                DrawCommand::Polyline { points, color, width } => self.stroke_polyline(points, *color, *width),
                DrawCommand::Rect { rect, color, width } => self.stroke_path(&rect.to_path(0.1), *color, *width),
                DrawCommand::Ellipse {
                    center,
                    radii,
                    color,
                    width,
                } => {
                    let ellipse = Ellipse::new(*center, *radii, 0.0);
                    self.stroke_path(&ellipse.to_path(0.1), *color, *width);
                }
                DrawCommand::Line { from, to, color, width } => {
                    self.stroke_polyline(&[*from, *to], *color, *width);
                }
                DrawCommand::Arrow {
                    from,
                    to,
                    head,
                    color,
                    width,
                } => {
                    self.stroke_polyline(&[*from, *to], *color, *width);
                    if let Some([left, right]) = head {
                        self.stroke_polyline(&[*left, *to, *right], *color, *width);
                    }
                }
                DrawCommand::Text {
                    position,
                    text,
                    color,
                    font_size,
                    ..
                } => self.draw_text(*position, text, *color, *font_size),
                DrawCommand::Image { image_ref, rect } => match images.get(image_ref) {
                    Some(image) => self.blit(image, *rect),
                    None => {
                        log::debug!("Image {} not loaded, drawing placeholder", image_ref);
                        self.stroke_path(&rect.to_path(0.1), Color::from_rgba8(200, 200, 200, 255), 1.0);
                    }
                },
            }
        }
    }

    fn clear(&mut self, color: Color) {
        let c = color.to_rgba8();
        let pixel = Rgba([c.r, c.g, c.b, c.a]);
        for p in self.surface.pixels_mut() {
            *p = pixel;
        }
    }

    /// Uniform scale of the current transform, for stroke widths and font sizes.
    fn transform_scale(&self) -> f64 {
        self.transform.determinant().abs().sqrt()
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Color, width: f64) {
        let device: Vec<Point> = points.iter().map(|p| self.transform * *p).collect();
        let half = (width * self.transform_scale() / 2.0).max(0.5);
        match device.as_slice() {
            [] => {}
            [only] => self.stroke_segment(*only, *only, half, color),
            _ => {
                for pair in device.windows(2) {
                    self.stroke_segment(pair[0], pair[1], half, color);
                }
            }
        }
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) {
        let device = self.transform * path.clone();
        let half = (width * self.transform_scale() / 2.0).max(0.5);
        let mut segments = Vec::new();
        let mut start = Point::ZERO;
        let mut last = Point::ZERO;
        kurbo::flatten(device.elements().iter().copied(), FLATTEN_TOLERANCE, |el| match el {
            PathEl::MoveTo(p) => {
                start = p;
                last = p;
            }
            PathEl::LineTo(p) => {
                segments.push((last, p));
                last = p;
            }
            PathEl::ClosePath => {
                segments.push((last, start));
                last = start;
            }
            _ => {}
        });
        for (a, b) in segments {
            self.stroke_segment(a, b, half, color);
        }
    }

    /// Antialiased capsule around the segment a→b in surface pixels.
    fn stroke_segment(&mut self, a: Point, b: Point, half_width: f64, color: Color) {
        let bounds = Rect::from_points(a, b).inflate(half_width + 1.0, half_width + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(bounds) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let d = point_to_segment_dist(center, a, b);
                let coverage = (half_width + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage as f32);
                }
            }
        }
    }

    fn draw_text(&mut self, position: Point, text: &str, color: Color, font_size: f64) {
        let Some(font) = self.font.clone() else {
            log::debug!("No font loaded, skipping text run");
            return;
        };
        let px = (font_size * self.transform_scale()) as f32;
        if !(px > 0.0) {
            return;
        }
        let origin = self.transform * position;
        // A half-turned transform flips glyph placement about the text origin.
        let flip = if self.transform.as_coeffs()[0] < 0.0 { -1.0 } else { 1.0 };
        let scaled = font.as_scaled(px);
        let line_height = px as f64 * LINE_HEIGHT;

        for (line_index, line) in text.lines().enumerate() {
            let baseline = line_index as f64 * line_height + scaled.ascent() as f64;
            let mut caret = 0.0f32;
            let mut previous = None;
            for ch in line.chars() {
                let id = font.glyph_id(ch);
                if let Some(prev) = previous {
                    caret += scaled.kern(prev, id);
                }
                let glyph = id.with_scale_and_position(px, point(caret, baseline as f32));
                caret += scaled.h_advance(id);
                previous = Some(id);

                let Some(outlined) = font.outline_glyph(glyph) else {
                    continue;
                };
                let bounds = outlined.px_bounds();
                let mut coverage = Vec::new();
                outlined.draw(|gx, gy, cov| {
                    if cov > 0.0 {
                        coverage.push((bounds.min.x + gx as f32, bounds.min.y + gy as f32, cov));
                    }
                });
                for (ux, uy, cov) in coverage {
                    let target = origin + Vec2::new(ux as f64, uy as f64) * flip;
                    let (tx, ty) = (target.x.floor(), target.y.floor());
                    if tx >= 0.0 && ty >= 0.0 && tx < self.surface.width() as f64 && ty < self.surface.height() as f64 {
                        self.blend(tx as u32, ty as u32, color, cov.min(1.0));
                    }
                }
            }
        }
    }

    /// Nearest-neighbour blit of `image` into the canvas-space `rect`.
    fn blit(&mut self, image: &DecodedImage, rect: Rect) {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        let inverse = self.transform.inverse();
        let device = self.transform.transform_rect_bbox(rect);
        let Some((x0, y0, x1, y1)) = self.clip(device) else {
            return;
        };
        let (w, h) = (image.width(), image.height());
        for y in y0..y1 {
            for x in x0..x1 {
                let canvas = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let u = (canvas.x - rect.x0) / rect.width();
                let v = (canvas.y - rect.y0) / rect.height();
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }
                let sx = ((u * w as f64) as u32).min(w - 1);
                let sy = ((v * h as f64) as u32).min(h - 1);
                if let Some([r, g, b, a]) = image.pixel(sx, sy) {
                    self.blend(x, y, Color::from_rgba8(r, g, b, a), 1.0);
                }
            }
        }
    }

    /// Pixel range of `rect` clipped to the surface, or `None` when empty.
    fn clip(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = (self.surface.width() as f64, self.surface.height() as f64);
        let x0 = rect.x0.floor().clamp(0.0, w);
        let y0 = rect.y0.floor().clamp(0.0, h);
        let x1 = rect.x1.ceil().clamp(0.0, w);
        let y1 = rect.y1.ceil().clamp(0.0, h);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn blend(&mut self, x: u32, y: u32, color: Color, coverage: f32) {
        let src = color.to_rgba8();
        let pixel = self.surface.get_pixel_mut(x, y);
        *pixel = source_over(*pixel, [src.r, src.g, src.b, src.a], coverage);
    }
}

/// Composite `src` (scaled by `coverage`) over `dst`, straight alpha.
pub(crate) fn source_over(dst: Rgba<u8>, src: [u8; 4], coverage: f32) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0 * coverage;
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    Rgba([channel(0), channel(1), channel(2), (out_a * 255.0).round().clamp(0.0, 255.0) as u8])
}

impl Renderer for RasterRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let commands = ctx.display_list();
        self.execute(&commands, ctx.canvas.images());
    }
}

impl std::fmt::Debug for RasterRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterRenderer")
            .field("size", &self.surface.dimensions())
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use tandem_core::canvas::Canvas;
    use tandem_core::tools::ToolKind;

    fn red() -> Color {
        Color::from_rgba8(255, 0, 0, 255)
    }

    #[test]
    fn test_zero_size_is_rejected() {
        assert!(matches!(
            RasterRenderer::new(0, 10),
            Err(RendererError::InvalidSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_clear_fills_surface() {
        let mut renderer = RasterRenderer::new(4, 4).unwrap();
        renderer.execute(&[DrawCommand::Clear(red())], &ImageStore::new());
        assert!(renderer.surface().pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn test_line_covers_pixels_along_it() {
        let mut renderer = RasterRenderer::new(20, 20).unwrap();
        renderer.execute(
            &[
                DrawCommand::Clear(Color::from_rgba8(0, 0, 0, 0)),
                DrawCommand::Line {
                    from: Point::new(2.0, 10.5),
                    to: Point::new(18.0, 10.5),
                    color: red(),
                    width: 3.0,
                },
            ],
            &ImageStore::new(),
        );
        assert_eq!(*renderer.surface().get_pixel(10, 10), Rgba([255, 0, 0, 255]));
        assert_eq!(renderer.surface().get_pixel(10, 2)[3], 0);
    }

    #[test]
    fn test_transform_scales_geometry() {
        let mut renderer = RasterRenderer::new(40, 40).unwrap();
        renderer.execute(
            &[
                DrawCommand::SetTransform(Affine::scale(2.0)),
                DrawCommand::Line {
                    from: Point::new(15.0, 5.0),
                    to: Point::new(15.0, 15.0),
                    color: red(),
                    width: 1.0,
                },
            ],
            &ImageStore::new(),
        );
        assert_eq!(renderer.surface().get_pixel(30, 20)[3], 255);
        assert_eq!(renderer.surface().get_pixel(15, 10)[3], 0);
    }

    #[test]
    fn test_rect_outline_leaves_interior_empty() {
        let mut renderer = RasterRenderer::new(40, 40).unwrap();
        renderer.execute(
            &[DrawCommand::Rect {
                rect: Rect::new(5.0, 5.0, 35.0, 35.0),
                color: red(),
                width: 2.0,
            }],
            &ImageStore::new(),
        );
        assert_eq!(renderer.surface().get_pixel(5, 20)[3], 255);
        assert_eq!(renderer.surface().get_pixel(20, 20)[3], 0);
    }

    #[test]
    fn test_image_blit_nearest_neighbour() {
        let mut store = ImageStore::new();
        let mut pixels = vec![0u8; 2 * 2 * 4];
        // Top-left blue, everything else green.
        for (i, px) in pixels.chunks_mut(4).enumerate() {
            px.copy_from_slice(if i == 0 { &[0, 0, 255, 255] } else { &[0, 255, 0, 255] });
        }
        let image_ref = store.insert(DecodedImage::new(2, 2, pixels).unwrap());
        let mut renderer = RasterRenderer::new(10, 10).unwrap();
        renderer.execute(
            &[DrawCommand::Image {
                image_ref,
                rect: Rect::new(0.0, 0.0, 8.0, 8.0),
            }],
            &store,
        );
        assert_eq!(*renderer.surface().get_pixel(1, 1), Rgba([0, 0, 255, 255]));
        assert_eq!(*renderer.surface().get_pixel(6, 6), Rgba([0, 255, 0, 255]));
        assert_eq!(renderer.surface().get_pixel(9, 9)[3], 0);
    }

    #[test]
    fn test_source_over_half_alpha() {
        let out = source_over(Rgba([255, 255, 255, 255]), [0, 0, 0, 255], 0.5);
        assert_eq!(out, Rgba([128, 128, 128, 255]));
        let onto_clear = source_over(Rgba([0, 0, 0, 0]), [10, 20, 30, 255], 1.0);
        assert_eq!(onto_clear, Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_build_scene_draws_canvas() {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Line);
        canvas.start_drawing(Point::new(0.0, 20.0));
        canvas.continue_drawing(Point::new(40.0, 20.0));
        canvas.end_drawing();

        let mut renderer = RasterRenderer::new(40, 40).unwrap();
        renderer.build_scene(&RenderContext::world(&canvas, Size::new(40.0, 40.0)));
        assert_eq!(renderer.surface().get_pixel(20, 19)[3], 255);
    }

    #[test]
    fn test_invalid_font_bytes() {
        assert!(matches!(RasterRenderer::load_font(vec![1, 2, 3]), Err(RendererError::Font(_))));
    }
}
