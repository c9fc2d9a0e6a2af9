//! View transform: pan offset, zoom scale and viewport geometry.

use crate::config::EngineConfig;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Snapshot of the view transform, as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Camera manages the view transform shared by all viewports.
///
/// It handles panning (translation) and zooming (scaling) operations,
/// converting between viewport-local screen coordinates and canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current scale.
    pub scale: f64,
    /// Minimum allowed scale.
    pub min_scale: f64,
    /// Maximum allowed scale.
    pub max_scale: f64,
    /// Multiplier for one zoom-in step.
    pub zoom_in_factor: f64,
    /// Multiplier for one zoom-out step.
    pub zoom_out_factor: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with the bounds and step factors of `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0_f64.clamp(config.min_scale, config.max_scale),
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_in_factor: config.zoom_in_factor,
            zoom_out_factor: config.zoom_out_factor,
        }
    }

    /// Get the affine transform for rendering (canvas to screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Get the inverse transform for input handling (screen to canvas).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        Point::new(
            (screen_point.x - self.offset.x) / self.scale,
            (screen_point.y - self.offset.y) / self.scale,
        )
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        Point::new(
            canvas_point.x * self.scale + self.offset.x,
            canvas_point.y * self.scale + self.offset.y,
        )
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping the canvas point under `screen_point` fixed.
    ///
    /// The resulting scale is clamped to the configured range. Returns whether
    /// the transform changed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }
        let ratio = new_scale / self.scale;
        let anchor = screen_point.to_vec2();
        self.offset = anchor - (anchor - self.offset) * ratio;
        self.scale = new_scale;
        true
    }

    /// One wheel step: zoom in for a positive sign, out otherwise.
    pub fn zoom_step(&mut self, delta_sign: f64, screen_point: Point) -> bool {
        let factor = if delta_sign > 0.0 {
            self.zoom_in_factor
        } else {
            self.zoom_out_factor
        };
        self.zoom_at(screen_point, factor)
    }

    /// Reset camera to the identity transform.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0_f64.clamp(self.min_scale, self.max_scale);
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            scale: self.scale,
            offset_x: self.offset.x,
            offset_y: self.offset.y,
        }
    }
}

/// Affine that turns a viewport of `size` half a turn about its own center.
pub fn half_turn(size: Size) -> Affine {
    Affine::new([-1.0, 0.0, 0.0, -1.0, size.width, size.height])
}

/// Placement of one viewport on screen.
///
/// A rotated viewport is displayed upside down, so pointer input on it is
/// reflected about the viewport center before the camera inverse is applied,
/// and pan deltas are negated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left corner in client coordinates.
    pub origin: Point,
    /// Size in client pixels.
    pub size: Size,
    /// Whether this viewport is displayed rotated by 180°.
    pub rotated: bool,
}

impl Viewport {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            origin,
            size,
            rotated: false,
        }
    }

    pub fn rotated(mut self, rotated: bool) -> Self {
        self.rotated = rotated;
        self
    }

    pub fn contains(&self, client: Point) -> bool {
        let local = client - self.origin;
        local.x >= 0.0 && local.y >= 0.0 && local.x <= self.size.width && local.y <= self.size.height
    }

    /// Map a client point into the camera's screen space for this viewport.
    pub fn client_to_screen(&self, client: Point) -> Point {
        let local = Point::new(client.x - self.origin.x, client.y - self.origin.y);
        if self.rotated {
            Point::new(self.size.width - local.x, self.size.height - local.y)
        } else {
            local
        }
    }

    /// Inverse of [`client_to_screen`](Self::client_to_screen).
    pub fn screen_to_client(&self, screen: Point) -> Point {
        let local = if self.rotated {
            Point::new(self.size.width - screen.x, self.size.height - screen.y)
        } else {
            screen
        };
        Point::new(local.x + self.origin.x, local.y + self.origin.y)
    }

    /// Map a client point to canvas coordinates.
    pub fn client_to_canvas(&self, camera: &Camera, client: Point) -> Point {
        camera.screen_to_canvas(self.client_to_screen(client))
    }

    /// Map a canvas point to client coordinates.
    pub fn canvas_to_client(&self, camera: &Camera, canvas_point: Point) -> Point {
        self.screen_to_client(camera.canvas_to_screen(canvas_point))
    }

    /// Convert a client-space drag delta into a camera pan delta.
    pub fn pan_delta(&self, delta: Vec2) -> Vec2 {
        if self.rotated { -delta } else { delta }
    }

    /// Canvas-to-viewport-local transform used to render this viewport.
    pub fn display_transform(&self, camera: &Camera) -> Affine {
        if self.rotated {
            half_turn(self.size) * camera.transform()
        } else {
            camera.transform()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9, "{a:?} != {b:?}");
        assert!((a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_canvas_with_offset_and_scale() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        camera.scale = 2.0;
        assert_close(camera.screen_to_canvas(Point::new(150.0, 300.0)), Point::new(50.0, 100.0));
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(30.0, -20.0);
        camera.scale = 1.5;
        for p in [Point::new(123.0, 456.0), Point::new(-7.5, 0.25), Point::ZERO] {
            assert_close(camera.screen_to_canvas(camera.canvas_to_screen(p)), p);
        }
    }

    #[test]
    fn test_affine_matches_direct_mapping() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(12.0, 34.0);
        camera.scale = 0.75;
        let p = Point::new(40.0, -8.0);
        assert_close(camera.transform() * p, camera.canvas_to_screen(p));
        assert_close(camera.inverse_transform() * p, camera.screen_to_canvas(p));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(-40.0, 25.0);
        camera.scale = 1.3;
        let anchor = Point::new(220.0, 140.0);
        let before = camera.screen_to_canvas(anchor);
        assert!(camera.zoom_step(1.0, anchor));
        assert_close(camera.canvas_to_screen(before), anchor);
        assert!(camera.zoom_step(-1.0, anchor));
        assert_close(camera.canvas_to_screen(before), anchor);
    }

    #[test]
    fn test_three_zoom_steps_increase_and_stay_bounded() {
        let mut camera = Camera::new();
        let mut last = camera.scale;
        for _ in 0..3 {
            camera.zoom_step(1.0, Point::new(100.0, 100.0));
            assert!(camera.scale > last);
            assert!(camera.scale <= camera.max_scale);
            last = camera.scale;
        }
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.scale - camera.min_scale).abs() < f64::EPSILON);

        camera.zoom_at(Point::ZERO, 1000.0);
        assert!((camera.scale - camera.max_scale).abs() < f64::EPSILON);

        // Already at the bound: no change reported.
        assert!(!camera.zoom_at(Point::ZERO, 2.0));
    }

    #[test]
    fn test_pan() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(10.0, 20.0));
        assert!((camera.offset.x - 10.0).abs() < f64::EPSILON);
        assert!((camera.offset.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rotated_viewport_reflects_about_center() {
        let viewport = Viewport::new(Point::new(800.0, 0.0), Size::new(800.0, 600.0)).rotated(true);
        let camera = Camera::new();
        // Top-left of the rotated pane is the bottom-right of shared space.
        assert_close(viewport.client_to_canvas(&camera, Point::new(800.0, 0.0)), Point::new(800.0, 600.0));
        assert_close(viewport.client_to_canvas(&camera, Point::new(1200.0, 300.0)), Point::new(400.0, 300.0));
    }

    #[test]
    fn test_viewport_roundtrip_rotated() {
        let viewport = Viewport::new(Point::new(10.0, 20.0), Size::new(640.0, 480.0)).rotated(true);
        let mut camera = Camera::new();
        camera.offset = Vec2::new(-33.0, 12.0);
        camera.scale = 2.5;
        let p = Point::new(17.0, 91.0);
        assert_close(viewport.client_to_canvas(&camera, viewport.canvas_to_client(&camera, p)), p);
    }

    #[test]
    fn test_display_transform_agrees_with_input_mapping() {
        let viewport = Viewport::new(Point::ZERO, Size::new(400.0, 300.0)).rotated(true);
        let mut camera = Camera::new();
        camera.offset = Vec2::new(5.0, 7.0);
        camera.scale = 1.25;
        let p = Point::new(60.0, 40.0);
        let drawn_at = viewport.display_transform(&camera) * p;
        assert_close(viewport.client_to_canvas(&camera, drawn_at), p);
    }

    #[test]
    fn test_rotated_pan_is_negated() {
        let viewport = Viewport::new(Point::ZERO, Size::new(100.0, 100.0)).rotated(true);
        assert_eq!(viewport.pan_delta(Vec2::new(3.0, -4.0)), Vec2::new(-3.0, 4.0));
        let upright = Viewport::new(Point::ZERO, Size::new(100.0, 100.0));
        assert_eq!(upright.pan_delta(Vec2::new(3.0, -4.0)), Vec2::new(3.0, -4.0));
    }
}
