//! Input state management for pointer, wheel and touch events.

use crate::config::EngineConfig;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in client coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
    /// The pointer left the viewport.
    Leave,
    /// Wheel notch. Positive `delta` zooms in.
    Wheel { position: Point, delta: f64 },
}

/// One active touch contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

/// Touch event carrying every contact still on the surface afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "touches", rename_all = "snake_case")]
pub enum TouchEvent {
    Start(Vec<TouchPoint>),
    Move(Vec<TouchPoint>),
    End(Vec<TouchPoint>),
}

impl TouchEvent {
    pub fn touches(&self) -> &[TouchPoint] {
        match self {
            TouchEvent::Start(t) | TouchEvent::Move(t) | TouchEvent::End(t) => t,
        }
    }
}

/// Tracks pointer state for one viewport.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Current pointer position in client coordinates.
    pub pointer_position: Point,
    /// Pointer position before the last move, for delta calculations.
    pub previous_pointer_position: Point,
    /// Currently pressed mouse buttons.
    pressed_buttons: HashSet<MouseButton>,
    /// Buttons that were just pressed this frame.
    just_pressed_buttons: HashSet<MouseButton>,
    /// Buttons that were just released this frame.
    just_released_buttons: HashSet<MouseButton>,
    /// Whether the primary pointer is currently dragging.
    pub is_dragging: bool,
    /// Start position of current drag operation.
    pub drag_start: Option<Point>,
    last_click_time: Option<Instant>,
    last_click_position: Option<Point>,
    double_click_detected: bool,
    double_click_ms: u128,
    double_click_distance: f64,
}

impl Default for InputState {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            pointer_position: Point::ZERO,
            previous_pointer_position: Point::ZERO,
            pressed_buttons: HashSet::new(),
            just_pressed_buttons: HashSet::new(),
            just_released_buttons: HashSet::new(),
            is_dragging: false,
            drag_start: None,
            last_click_time: None,
            last_click_position: None,
            double_click_detected: false,
            double_click_ms: u128::from(config.double_click_ms),
            double_click_distance: config.double_click_distance,
        }
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.just_pressed_buttons.clear();
        self.just_released_buttons.clear();
        self.double_click_detected = false;
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down { position, button } => {
                self.move_to(position);
                if self.pressed_buttons.insert(button) {
                    self.just_pressed_buttons.insert(button);
                }
                if button == MouseButton::Left {
                    self.register_click(position);
                    if !self.is_dragging {
                        self.is_dragging = true;
                        self.drag_start = Some(position);
                    }
                }
            }
            PointerEvent::Up { position, button } => {
                self.move_to(position);
                if self.pressed_buttons.remove(&button) {
                    self.just_released_buttons.insert(button);
                }
                if button == MouseButton::Left {
                    self.end_drag();
                }
            }
            PointerEvent::Move { position } => self.move_to(position),
            PointerEvent::Leave => {
                for button in self.pressed_buttons.drain() {
                    self.just_released_buttons.insert(button);
                }
                self.end_drag();
            }
            PointerEvent::Wheel { position, .. } => self.move_to(position),
        }
    }

    /// Record a click or tap for double-click detection.
    pub fn register_click(&mut self, position: Point) {
        let now = Instant::now();
        if let (Some(last_time), Some(last_pos)) = (self.last_click_time, self.last_click_position) {
            let elapsed = now.duration_since(last_time).as_millis();
            if elapsed < self.double_click_ms && position.distance(last_pos) < self.double_click_distance {
                self.double_click_detected = true;
                // Reset to prevent triple-click being detected as another double-click
                self.last_click_time = None;
                self.last_click_position = None;
                return;
            }
        }
        self.last_click_time = Some(now);
        self.last_click_position = Some(position);
    }

    /// Begin a single-contact drag (touch) at `position`.
    pub fn begin_drag(&mut self, position: Point) {
        self.move_to(position);
        self.is_dragging = true;
        self.drag_start = Some(position);
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
        self.drag_start = None;
    }

    /// Move the tracked pointer, keeping the previous position for deltas.
    pub fn move_to(&mut self, position: Point) {
        self.previous_pointer_position = self.pointer_position;
        self.pointer_position = position;
    }

    /// Check if a button is currently pressed.
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Check if a button was just pressed this frame.
    pub fn is_button_just_pressed(&self, button: MouseButton) -> bool {
        self.just_pressed_buttons.contains(&button)
    }

    /// Check if a button was just released this frame.
    pub fn is_button_just_released(&self, button: MouseButton) -> bool {
        self.just_released_buttons.contains(&button)
    }

    /// Check if a double-click was detected this frame.
    pub fn is_double_click(&self) -> bool {
        self.double_click_detected
    }

    /// Pointer movement caused by the last event.
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_position - self.previous_pointer_position
    }

    /// Get the drag delta from start position, if dragging.
    pub fn drag_delta(&self) -> Option<Vec2> {
        self.drag_start.map(|start| self.pointer_position - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    #[test]
    fn test_button_press_and_release() {
        let mut input = InputState::new();
        input.handle_pointer_event(&down(100.0, 100.0));
        assert!(input.is_button_pressed(MouseButton::Left));
        assert!(input.is_button_just_pressed(MouseButton::Left));
        assert!(!input.is_button_pressed(MouseButton::Right));

        input.handle_pointer_event(&up(100.0, 100.0));
        assert!(!input.is_button_pressed(MouseButton::Left));
        assert!(input.is_button_just_released(MouseButton::Left));
    }

    #[test]
    fn test_begin_frame_clears_just_pressed() {
        let mut input = InputState::new();
        input.handle_pointer_event(&down(100.0, 100.0));
        input.begin_frame();
        assert!(!input.is_button_just_pressed(MouseButton::Left));
        assert!(input.is_button_pressed(MouseButton::Left)); // Still pressed
    }

    #[test]
    fn test_drag_tracking() {
        let mut input = InputState::new();
        input.handle_pointer_event(&down(100.0, 100.0));
        assert!(input.is_dragging);
        assert_eq!(input.drag_start, Some(Point::new(100.0, 100.0)));

        input.handle_pointer_event(&PointerEvent::Move {
            position: Point::new(150.0, 120.0),
        });
        assert_eq!(input.drag_delta(), Some(Vec2::new(50.0, 20.0)));
        assert_eq!(input.pointer_delta(), Vec2::new(50.0, 20.0));
    }

    #[test]
    fn test_leave_ends_drag() {
        let mut input = InputState::new();
        input.handle_pointer_event(&down(10.0, 10.0));
        input.handle_pointer_event(&PointerEvent::Leave);
        assert!(!input.is_dragging);
        assert!(!input.is_button_pressed(MouseButton::Left));
        assert!(input.is_button_just_released(MouseButton::Left));
    }

    #[test]
    fn test_double_click_detection() {
        let mut input = InputState::new();
        input.handle_pointer_event(&down(100.0, 100.0));
        assert!(!input.is_double_click());
        input.handle_pointer_event(&up(100.0, 100.0));
        input.begin_frame();

        input.handle_pointer_event(&down(101.0, 100.0));
        assert!(input.is_double_click());

        input.begin_frame();
        assert!(!input.is_double_click());
    }

    #[test]
    fn test_double_click_too_far() {
        let mut input = InputState::new();
        input.handle_pointer_event(&down(100.0, 100.0));
        input.handle_pointer_event(&up(100.0, 100.0));
        input.begin_frame();
        input.handle_pointer_event(&down(200.0, 200.0));
        assert!(!input.is_double_click());
    }

    #[test]
    fn test_double_click_window_from_config() {
        let config = EngineConfig {
            double_click_ms: 0,
            ..EngineConfig::default()
        };
        let mut input = InputState::from_config(&config);
        input.register_click(Point::ZERO);
        input.register_click(Point::ZERO);
        assert!(!input.is_double_click());
    }

    #[test]
    fn test_touch_event_json() {
        let event: TouchEvent =
            serde_json::from_str(r#"{"kind":"start","touches":[{"id":1,"position":{"x":1.0,"y":2.0}}]}"#).unwrap();
        assert_eq!(event.touches()[0].position, Point::new(1.0, 2.0));
    }
}
