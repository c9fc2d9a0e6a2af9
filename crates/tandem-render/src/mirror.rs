//! Draws raster mirror plans into the secondary pane's backing store.

use crate::renderer::{RenderResult, RendererError};
use image::{Rgba, RgbaImage};
use kurbo::Point;
use tandem_core::mirror::MirrorPlan;

/// Backing store for the mirrored pane.
#[derive(Debug, Clone, Default)]
pub struct MirrorRenderer {
    surface: Option<RgbaImage>,
}

impl MirrorRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last rendered mirror frame, if any.
    pub fn surface(&self) -> Option<&RgbaImage> {
        self.surface.as_ref()
    }

    /// Render `plan`, reallocating the backing store when the target size changed.
    ///
    /// Each target pixel samples the frame pixel its center maps back to.
    /// Samples outside the frame are white.
    pub fn render(&mut self, plan: &MirrorPlan) -> RenderResult<&RgbaImage> {
        let (width, height) = (plan.target.width.round() as u32, plan.target.height.round() as u32);
        if width == 0 || height == 0 {
            return Err(RendererError::InvalidSize { width, height });
        }
        if self.surface.as_ref().is_some_and(|s| s.dimensions() != (width, height)) {
            self.surface = None;
        }
        let surface = self.surface.get_or_insert_with(|| {
            log::debug!("Allocating mirror surface {}x{}", width, height);
            RgbaImage::new(width, height)
        });

        let inverse = plan.transform.inverse();
        let frame = &plan.frame;
        for (x, y, pixel) in surface.enumerate_pixels_mut() {
            let source = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let sample = if source.x >= 0.0 && source.y >= 0.0 {
                frame.pixel(source.x as u32, source.y as u32)
            } else {
                None
            };
            *pixel = Rgba(sample.unwrap_or([255, 255, 255, 255]));
        }
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use tandem_core::camera::ViewState;
    use tandem_core::decode::DecodedImage;
    use tandem_core::mirror::RasterMirror;

    /// 4x2 frame: left half red, right half blue.
    fn frame() -> DecodedImage {
        let mut data = Vec::new();
        for _y in 0..2 {
            for x in 0..4 {
                data.extend_from_slice(if x < 2 { &[255, 0, 0, 255] } else { &[0, 0, 255, 255] });
            }
        }
        DecodedImage::new(4, 2, data).unwrap()
    }

    #[test]
    fn test_rotation_swaps_sides() {
        let mut mirror = RasterMirror::new(Size::new(4.0, 2.0), Size::new(4.0, 2.0));
        mirror.update_frame(frame());
        let plan = mirror.take_plan().unwrap();
        let mut renderer = MirrorRenderer::new();
        let out = renderer.render(&plan).unwrap();
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*out.get_pixel(3, 1), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_crop_fills_target() {
        let mut mirror = RasterMirror::new(Size::new(4.0, 2.0), Size::new(8.0, 8.0));
        mirror.update_frame(frame());
        // Zoomed in on the red half: the whole mirror is red.
        mirror.update_view(ViewState {
            scale: 2.0,
            offset_x: 0.0,
            offset_y: 0.0,
        });
        let plan = mirror.take_plan().unwrap();
        let out = MirrorRenderer::new().render(&plan).unwrap().clone();
        assert!(out.pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn test_outside_frame_is_white() {
        let mut mirror = RasterMirror::new(Size::new(4.0, 2.0), Size::new(4.0, 2.0));
        mirror.update_frame(frame());
        mirror.update_view(ViewState {
            scale: 1.0,
            offset_x: 10.0,
            offset_y: 0.0,
        });
        let plan = mirror.take_plan().unwrap();
        let out = MirrorRenderer::new().render(&plan).unwrap().clone();
        assert!(out.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_resize_reallocates_and_redraws_from_cache() {
        let mut mirror = RasterMirror::new(Size::new(4.0, 2.0), Size::new(4.0, 2.0));
        mirror.update_frame(frame());
        let mut renderer = MirrorRenderer::new();
        renderer.render(&mirror.take_plan().unwrap()).unwrap();

        mirror.resize(Size::new(8.0, 4.0));
        let out = renderer.render(&mirror.take_plan().unwrap()).unwrap();
        assert_eq!(out.dimensions(), (8, 4));
        assert_eq!(*out.get_pixel(7, 3), Rgba([255, 0, 0, 255]));
    }
}
