//! Two-pointer pinch/pan recognition.

use kurbo::{Point, Vec2};

/// What a pinch sample asks the camera to do.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PinchUpdate {
    /// Incremental zoom factor and the midpoint to anchor it at.
    pub zoom: Option<(f64, Point)>,
    /// Midpoint movement since the previous sample.
    pub pan: Option<Vec2>,
}

/// Thresholds for separating zoom from pan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchThresholds {
    /// Zoom updates smaller than this relative change are skipped.
    pub zoom_threshold: f64,
    /// Pan is applied only while the incremental zoom is within this band of 1.
    pub pan_tolerance: f64,
}

impl Default for PinchThresholds {
    fn default() -> Self {
        Self {
            zoom_threshold: 0.01,
            pan_tolerance: 0.05,
        }
    }
}

/// State of an in-progress two-pointer gesture.
///
/// Pointers are given in client coordinates; the caller maps the resulting
/// zoom anchor and pan delta through its viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct PinchGesture {
    start_distance: f64,
    last_ratio: f64,
    last_midpoint: Point,
}

impl PinchGesture {
    /// Begin a gesture. Returns `None` when both pointers coincide.
    pub fn begin(a: Point, b: Point) -> Option<Self> {
        let distance = a.distance(b);
        if !distance.is_finite() || distance <= f64::EPSILON {
            return None;
        }
        Some(Self {
            start_distance: distance,
            last_ratio: 1.0,
            last_midpoint: a.midpoint(b),
        })
    }

    /// Feed a new pair of pointer positions.
    pub fn update(&mut self, a: Point, b: Point, thresholds: PinchThresholds) -> PinchUpdate {
        let distance = a.distance(b);
        if !distance.is_finite() || distance <= f64::EPSILON {
            return PinchUpdate::default();
        }

        let midpoint = a.midpoint(b);
        let ratio = distance / self.start_distance;
        let incremental = ratio / self.last_ratio;
        let mut update = PinchUpdate::default();

        if (incremental - 1.0).abs() >= thresholds.zoom_threshold {
            update.zoom = Some((incremental, midpoint));
            self.last_ratio = ratio;
        }
        if (incremental - 1.0).abs() <= thresholds.pan_tolerance {
            let delta = midpoint - self.last_midpoint;
            if delta != Vec2::ZERO {
                update.pan = Some(delta);
            }
        }
        self.last_midpoint = midpoint;
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_pinch_is_rejected() {
        assert!(PinchGesture::begin(Point::new(5.0, 5.0), Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_spread_zooms_about_midpoint() {
        let mut pinch = PinchGesture::begin(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).unwrap();
        let update = pinch.update(Point::new(-25.0, 0.0), Point::new(125.0, 0.0), PinchThresholds::default());
        let (factor, center) = update.zoom.unwrap();
        assert!((factor - 1.5).abs() < 1e-10);
        assert_eq!(center, Point::new(50.0, 0.0));
        // A 50% change is well outside the pan band.
        assert!(update.pan.is_none());
    }

    #[test]
    fn test_small_changes_accumulate() {
        let mut pinch = PinchGesture::begin(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).unwrap();
        let t = PinchThresholds::default();
        // 0.5% each: below the zoom threshold.
        assert!(pinch.update(Point::new(0.0, 0.0), Point::new(100.5, 0.0), t).zoom.is_none());
        let update = pinch.update(Point::new(0.0, 0.0), Point::new(101.2, 0.0), t);
        let (factor, _) = update.zoom.unwrap();
        assert!((factor - 1.012).abs() < 1e-10);
    }

    #[test]
    fn test_two_finger_drag_pans() {
        let mut pinch = PinchGesture::begin(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).unwrap();
        let update = pinch.update(Point::new(10.0, 20.0), Point::new(110.0, 20.0), PinchThresholds::default());
        assert!(update.zoom.is_none());
        assert_eq!(update.pan, Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_collapsed_sample_is_skipped() {
        let mut pinch = PinchGesture::begin(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).unwrap();
        let update = pinch.update(Point::new(30.0, 30.0), Point::new(30.0, 30.0), PinchThresholds::default());
        assert_eq!(update, PinchUpdate::default());
    }
}
