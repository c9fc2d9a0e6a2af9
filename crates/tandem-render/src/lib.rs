//! Tandem Render Library
//!
//! Display lists, a CPU raster backend, raster-mirror rendering, PNG export
//! and an `image`-crate decoder for Tandem.

mod decoder;
mod export;
mod mirror;
mod raster;
mod renderer;

pub use decoder::ImageCrateDecoder;
pub use export::{
    encode_png, export_png, flatten_over_white, render_viewport, render_viewport_snapshot, render_world_snapshot,
    save_png,
};
pub use mirror::MirrorRenderer;
pub use raster::RasterRenderer;
pub use renderer::{DrawCommand, RenderContext, RenderResult, Renderer, RendererError, build_display_list};

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};
    use tandem_core::canvas::Canvas;
    use tandem_core::raster_history::{RasterEntry, RasterHistory, RestoreOutcome};

    fn snapshot_png(canvas: &Canvas) -> Vec<u8> {
        let frame = render_world_snapshot(canvas, Size::new(16.0, 16.0), None).unwrap();
        encode_png(frame.rgba(), frame.width(), frame.height()).unwrap()
    }

    #[test]
    fn test_raster_history_restores_through_decoder() {
        let decoder = ImageCrateDecoder::new();
        let mut canvas = Canvas::new();
        let mut history = RasterHistory::default();

        canvas.start_drawing(Point::new(2.5, 2.5));
        canvas.end_drawing();
        history.commit(RasterEntry::new(snapshot_png(&canvas), Vec::new()));
        canvas.start_drawing(Point::new(12.5, 12.5));
        canvas.end_drawing();
        history.commit(RasterEntry::new(snapshot_png(&canvas), Vec::new()));

        let request = history.undo().unwrap();
        let decoded = pollster::block_on(request.decode(&decoder));
        match history.complete(request.ticket, decoded) {
            RestoreOutcome::Applied { image: Some(image), .. } => {
                assert_eq!(image.pixel(2, 2), Some([0, 0, 0, 255]));
                assert_eq!(image.pixel(12, 12), Some([255, 255, 255, 255]));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_snapshot_rolls_back() {
        let decoder = ImageCrateDecoder::new();
        let mut history = RasterHistory::default();
        history.commit(RasterEntry::new(b"not a png".to_vec(), Vec::new()));
        history.commit(RasterEntry::new(snapshot_png(&Canvas::new()), Vec::new()));
        let before = history.current().clone();

        let request = history.undo().unwrap();
        let decoded = pollster::block_on(request.decode(&decoder));
        assert!(matches!(history.complete(request.ticket, decoded), RestoreOutcome::Failed(_)));
        assert_eq!(history.current(), &before);
    }
}
