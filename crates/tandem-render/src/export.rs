//! Still-image output: viewport renders, canvas-space snapshots and PNG export.

use crate::raster::{RasterRenderer, source_over};
use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use ab_glyph::FontArc;
use image::{Rgba, RgbaImage};
use kurbo::Size;
use std::path::Path;
use tandem_core::camera::Viewport;
use tandem_core::canvas::Canvas;
use tandem_core::decode::DecodedImage;

fn pixel_size(size: Size) -> RenderResult<(u32, u32)> {
    let (w, h) = (size.width.round(), size.height.round());
    if !(w >= 1.0 && h >= 1.0 && w <= u32::MAX as f64 && h <= u32::MAX as f64) {
        return Err(RendererError::InvalidSize {
            width: w.max(0.0) as u32,
            height: h.max(0.0) as u32,
        });
    }
    Ok((w as u32, h as u32))
}

fn render(ctx: &RenderContext, font: Option<&FontArc>) -> RenderResult<RgbaImage> {
    let (width, height) = pixel_size(ctx.size)?;
    let mut renderer = RasterRenderer::new(width, height)?;
    if let Some(font) = font {
        renderer = renderer.with_font(font.clone());
    }
    renderer.build_scene(ctx);
    Ok(renderer.into_surface())
}

/// Render what `viewport` shows, over a transparent background.
pub fn render_viewport(canvas: &Canvas, viewport: &Viewport, font: Option<&FontArc>) -> RenderResult<RgbaImage> {
    render(&RenderContext::new(canvas, viewport), font)
}

/// Render canvas space at scale 1 from the origin, composited over white.
pub fn render_world_snapshot(canvas: &Canvas, size: Size, font: Option<&FontArc>) -> RenderResult<DecodedImage> {
    into_frame(render(&RenderContext::world(canvas, size), font)?)
}

/// Render what `viewport` shows, composited over white.
///
/// This is the frame a raster mirror crops from; its canvas-to-frame
/// transform is `viewport.display_transform(&canvas.camera)`.
pub fn render_viewport_snapshot(
    canvas: &Canvas,
    viewport: &Viewport,
    font: Option<&FontArc>,
) -> RenderResult<DecodedImage> {
    into_frame(render_viewport(canvas, viewport, font)?)
}

fn into_frame(mut surface: RgbaImage) -> RenderResult<DecodedImage> {
    flatten_over_white(&mut surface);
    let (width, height) = surface.dimensions();
    DecodedImage::new(width, height, surface.into_raw()).map_err(|e| RendererError::Encode(e.to_string()))
}

/// Composite every pixel over an opaque white background.
pub fn flatten_over_white(surface: &mut RgbaImage) {
    for pixel in surface.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        *pixel = source_over(Rgba([255, 255, 255, 255]), [r, g, b, a], 1.0);
    }
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| RendererError::Encode(format!("PNG data: {e}")))?;
    }
    Ok(png_data)
}

/// Export the viewport's pixels over opaque white as PNG bytes.
pub fn export_png(canvas: &Canvas, viewport: &Viewport, font: Option<&FontArc>) -> RenderResult<Vec<u8>> {
    let mut surface = render_viewport(canvas, viewport, font)?;
    flatten_over_white(&mut surface);
    let (width, height) = surface.dimensions();
    let png_data = encode_png(surface.as_raw(), width, height)?;
    log::info!("PNG export complete: {}x{}, {} bytes", width, height, png_data.len());
    Ok(png_data)
}

/// Write an [`RgbaImage`] to `path` as PNG.
pub fn save_png(surface: &RgbaImage, path: &Path) -> RenderResult<()> {
    let (width, height) = surface.dimensions();
    let png_data = encode_png(surface.as_raw(), width, height)?;
    std::fs::write(path, png_data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use tandem_core::tools::ToolKind;

    fn canvas_with_line() -> Canvas {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Line);
        canvas.start_drawing(Point::new(0.0, 10.0));
        canvas.continue_drawing(Point::new(20.0, 10.0));
        canvas.end_drawing();
        canvas
    }

    #[test]
    fn test_export_is_opaque_over_white() {
        let canvas = canvas_with_line();
        let viewport = Viewport::new(Point::ZERO, Size::new(20.0, 20.0));
        let bytes = export_png(&canvas, &viewport, None).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (20, 20));
        assert_eq!(*decoded.get_pixel(5, 2), Rgba([255, 255, 255, 255]));
        assert_eq!(*decoded.get_pixel(5, 9), Rgba([0, 0, 0, 255]));
        assert!(decoded.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_export_follows_view_transform() {
        let mut canvas = canvas_with_line();
        canvas.pan(kurbo::Vec2::new(0.0, 5.0));
        let viewport = Viewport::new(Point::ZERO, Size::new(20.0, 20.0));
        let bytes = export_png(&canvas, &viewport, None).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(*decoded.get_pixel(5, 14), Rgba([0, 0, 0, 255]));
        assert_eq!(*decoded.get_pixel(5, 9), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_world_snapshot_ignores_camera() {
        let mut canvas = canvas_with_line();
        canvas.zoom_at(Point::ZERO, 3.0);
        let frame = render_world_snapshot(&canvas, Size::new(20.0, 20.0), None).unwrap();
        assert_eq!(frame.pixel(5, 9), Some([0, 0, 0, 255]));
        assert_eq!(frame.pixel(5, 2), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_viewport_snapshot_follows_camera() {
        let mut canvas = canvas_with_line();
        canvas.pan(kurbo::Vec2::new(0.0, 5.0));
        let viewport = Viewport::new(Point::ZERO, Size::new(20.0, 20.0));
        let frame = render_viewport_snapshot(&canvas, &viewport, None).unwrap();
        assert_eq!(frame.pixel(5, 14), Some([0, 0, 0, 255]));
        assert_eq!(frame.pixel(5, 9), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_zero_viewport_is_an_error() {
        let canvas = Canvas::new();
        let viewport = Viewport::new(Point::ZERO, Size::new(0.0, 10.0));
        assert!(matches!(
            export_png(&canvas, &viewport, None),
            Err(RendererError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_save_png_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let surface = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
        save_png(&surface, &path).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back, surface);
    }
}
