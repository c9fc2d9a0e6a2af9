//! One-way raster mirror: crop the primary's visible window out of its
//! canvas-space snapshot and show it rotated half a turn in the secondary pane.
//!
//! Each snapshot carries the canvas-to-frame transform it was rendered with,
//! so the window can be cropped from a frame of the primary's pixels as well
//! as from a canvas-space frame at scale 1.

use crate::camera::{ViewState, half_turn};
use crate::decode::DecodedImage;
use kurbo::{Affine, Rect, Size, Vec2};

/// Region of the canvas visible in the primary viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceWindow {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceWindow {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Canvas window shown by a viewport of `viewport` size under `view`.
pub fn source_window(view: &ViewState, viewport: Size) -> SourceWindow {
    SourceWindow {
        x: -view.offset_x / view.scale,
        y: -view.offset_y / view.scale,
        width: viewport.width / view.scale,
        height: viewport.height / view.scale,
    }
}

/// Maps source-window coordinates onto a `target` viewport, filling it edge to
/// edge and turned 180° about its center.
pub fn mirror_transform(window: &SourceWindow, target: Size) -> Affine {
    let sx = target.width / window.width;
    let sy = target.height / window.height;
    half_turn(target) * Affine::scale_non_uniform(sx, sy) * Affine::translate(Vec2::new(-window.x, -window.y))
}

/// What to draw for one mirror frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorPlan {
    pub frame: DecodedImage,
    /// Source window in canvas coordinates.
    pub window: SourceWindow,
    /// Frame pixels to target pixels.
    pub transform: Affine,
    pub target: Size,
}

/// Cached mirror state for the secondary pane.
#[derive(Debug, Clone)]
pub struct RasterMirror {
    frame: Option<DecodedImage>,
    /// Canvas coordinates to frame pixels.
    frame_transform: Affine,
    view: ViewState,
    source_size: Size,
    target: Size,
    dirty: bool,
}

impl RasterMirror {
    /// `source_size` is the primary viewport size, `target` the secondary one.
    pub fn new(source_size: Size, target: Size) -> Self {
        Self {
            frame: None,
            frame_transform: Affine::IDENTITY,
            view: ViewState {
                scale: 1.0,
                offset_x: 0.0,
                offset_y: 0.0,
            },
            source_size,
            target,
            dirty: true,
        }
    }

    /// A new canvas-space snapshot arrived: scale 1, pixel (0, 0) at the canvas origin.
    pub fn update_frame(&mut self, frame: DecodedImage) {
        self.update_frame_with(frame, Affine::IDENTITY);
    }

    /// A new snapshot arrived, rendered through `canvas_to_frame`.
    ///
    /// Passing the primary's display transform lets the frame be exactly the
    /// primary's pixels, whatever its pan and zoom.
    pub fn update_frame_with(&mut self, frame: DecodedImage, canvas_to_frame: Affine) {
        self.frame = Some(frame);
        self.frame_transform = canvas_to_frame;
        self.dirty = true;
    }

    /// The primary view changed. Returns whether a redraw is needed.
    pub fn update_view(&mut self, view: ViewState) -> bool {
        if view != self.view {
            self.view = view;
            self.dirty = true;
        }
        self.dirty
    }

    pub fn set_source_size(&mut self, size: Size) {
        if size != self.source_size {
            self.source_size = size;
            self.dirty = true;
        }
    }

    /// The secondary pane changed size. The cached frame is kept so the next
    /// plan redraws immediately.
    pub fn resize(&mut self, target: Size) {
        if target != self.target {
            log::debug!("Mirror resized to {}x{}", target.width, target.height);
            self.target = target;
            self.dirty = true;
        }
    }

    pub fn frame(&self) -> Option<&DecodedImage> {
        self.frame.as_ref()
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn target(&self) -> Size {
        self.target
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current plan regardless of the dirty flag. `None` until a frame arrives
    /// or while either viewport is empty.
    pub fn plan(&self) -> Option<MirrorPlan> {
        let frame = self.frame.clone()?;
        if self.target.is_zero_area() || self.source_size.is_zero_area() || !(self.view.scale > 0.0) {
            return None;
        }
        let window = source_window(&self.view, self.source_size);
        Some(MirrorPlan {
            frame,
            transform: mirror_transform(&window, self.target) * self.frame_transform.inverse(),
            window,
            target: self.target,
        })
    }

    /// Plan the next redraw if anything changed since the last one.
    pub fn take_plan(&mut self) -> Option<MirrorPlan> {
        if !self.dirty {
            return None;
        }
        let plan = self.plan()?;
        self.dirty = false;
        Some(plan)
    }
}
