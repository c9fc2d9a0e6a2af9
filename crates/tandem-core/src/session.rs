//! Two-pane session: one shared canvas, two viewports, one active input source.

use crate::camera::Viewport;
use crate::canvas::Canvas;
use crate::config::EngineConfig;
use crate::gesture::{PinchGesture, PinchThresholds};
use crate::input::{InputState, MouseButton, PointerEvent, TouchEvent, TouchPoint};
use crate::tools::ToolKind;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// One of the two viewports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pane {
    Primary,
    Secondary,
}

impl Pane {
    pub fn other(self) -> Self {
        match self {
            Pane::Primary => Pane::Secondary,
            Pane::Secondary => Pane::Primary,
        }
    }

    fn index(self) -> usize {
        match self {
            Pane::Primary => 0,
            Pane::Secondary => 1,
        }
    }
}

/// How the secondary pane follows the primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorMode {
    /// The secondary pane shows a rotated crop of the primary's raster snapshot
    /// and never takes input.
    Raster,
    /// Both panes render and can edit the shared canvas, one at a time.
    #[default]
    Shared,
}

#[derive(Debug, Clone, Default)]
struct TouchState {
    pinch: Option<PinchGesture>,
    /// Set when a pinch ends with one finger still down; cleared on full lift.
    suppressed: bool,
}

#[derive(Debug, Clone)]
struct PaneState {
    viewport: Viewport,
    input: InputState,
    /// Canvas point of a press on a text element, held back until the pointer
    /// moves so the first click of a double-click leaves no mark.
    deferred: Option<Point>,
}

/// A shared canvas viewed through two panes.
#[derive(Debug, Clone)]
pub struct Session {
    canvas: Canvas,
    panes: [PaneState; 2],
    touch: TouchState,
    thresholds: PinchThresholds,
    active: Pane,
    mode: MirrorMode,
}

impl Session {
    pub fn new(config: &EngineConfig, mode: MirrorMode, primary: Viewport, secondary: Viewport) -> Self {
        let pane = |viewport| PaneState {
            viewport,
            input: InputState::from_config(config),
            deferred: None,
        };
        Self {
            canvas: Canvas::with_config(config),
            panes: [pane(primary), pane(secondary)],
            touch: TouchState::default(),
            thresholds: PinchThresholds {
                zoom_threshold: config.pinch_zoom_threshold,
                pan_tolerance: config.pinch_pan_tolerance,
            },
            active: Pane::Primary,
            mode,
        }
    }

    /// Two panes of `pane_size` stacked vertically, as on a table between two
    /// people. In shared mode the lower pane is rotated to face the other side.
    pub fn face_to_face(config: &EngineConfig, mode: MirrorMode, pane_size: Size) -> Self {
        let primary = Viewport::new(Point::ZERO, pane_size);
        let secondary =
            Viewport::new(Point::new(0.0, pane_size.height), pane_size).rotated(mode == MirrorMode::Shared);
        Self::new(config, mode, primary, secondary)
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn mode(&self) -> MirrorMode {
        self.mode
    }

    pub fn active(&self) -> Pane {
        self.active
    }

    pub fn viewport(&self, pane: Pane) -> &Viewport {
        &self.panes[pane.index()].viewport
    }

    /// Replace a pane's geometry, e.g. after a resize.
    pub fn set_viewport(&mut self, pane: Pane, viewport: Viewport) {
        self.panes[pane.index()].viewport = viewport;
    }

    /// Input handlers for `pane`, or `None` when it is not the active input source.
    pub fn input(&mut self, pane: Pane) -> Option<PaneInput<'_>> {
        if pane != self.active {
            return None;
        }
        let state = &mut self.panes[pane.index()];
        Some(PaneInput {
            canvas: &mut self.canvas,
            viewport: &state.viewport,
            input: &mut state.input,
            deferred: &mut state.deferred,
            touch: &mut self.touch,
            thresholds: self.thresholds,
        })
    }

    /// Swap which pane takes input, finalizing any gesture on the old one first.
    ///
    /// Refused in raster mode, where the secondary pane is display-only.
    pub fn flip_roles(&mut self) -> bool {
        if self.mode == MirrorMode::Raster {
            log::warn!("Role flip ignored: raster mirror is display-only");
            return false;
        }
        self.canvas.end_drawing();
        let pane = &mut self.panes[self.active.index()];
        pane.input.end_drag();
        pane.deferred = None;
        self.touch = TouchState::default();
        self.active = self.active.other();
        log::info!("Active pane is now {:?}", self.active);
        true
    }
}

/// Event handlers bound to the active pane.
pub struct PaneInput<'a> {
    canvas: &'a mut Canvas,
    viewport: &'a Viewport,
    input: &'a mut InputState,
    deferred: &'a mut Option<Point>,
    touch: &'a mut TouchState,
    thresholds: PinchThresholds,
}

impl PaneInput<'_> {
    /// Handle a pointer event in client coordinates. Returns whether it was consumed.
    pub fn pointer(&mut self, event: &PointerEvent) -> bool {
        match *event {
            PointerEvent::Down { position, button } => {
                if button != MouseButton::Left || !self.viewport.contains(position) {
                    return false;
                }
                self.input.handle_pointer_event(event);
                self.press(position)
            }
            PointerEvent::Move { position } => {
                if !self.input.is_dragging {
                    self.input.handle_pointer_event(event);
                    return false;
                }
                self.input.handle_pointer_event(event);
                self.drag(position)
            }
            PointerEvent::Up { button, .. } => {
                if button != MouseButton::Left {
                    return false;
                }
                self.input.handle_pointer_event(event);
                *self.deferred = None;
                self.canvas.end_drawing()
            }
            PointerEvent::Leave => {
                self.input.handle_pointer_event(event);
                *self.deferred = None;
                self.canvas.end_drawing()
            }
            PointerEvent::Wheel { position, delta } => {
                if !self.viewport.contains(position) || delta == 0.0 || !delta.is_finite() {
                    return false;
                }
                self.input.handle_pointer_event(event);
                let anchor = self.viewport.client_to_screen(position);
                self.canvas.zoom_step(delta.signum(), anchor)
            }
        }
    }

    /// Handle a touch event in client coordinates. Returns whether it was consumed.
    pub fn touch(&mut self, event: &TouchEvent) -> bool {
        match event.touches() {
            [] => {
                self.touch.pinch = None;
                self.touch.suppressed = false;
                self.input.end_drag();
                *self.deferred = None;
                self.canvas.end_drawing();
                true
            }
            [one] => self.single_touch(event, *one),
            [a, b, ..] => self.pinch(a.position, b.position),
        }
    }

    fn single_touch(&mut self, event: &TouchEvent, touch: TouchPoint) -> bool {
        if self.touch.pinch.take().is_some() {
            // The remaining finger of a pinch must not start drawing.
            self.touch.suppressed = true;
            return true;
        }
        if self.touch.suppressed {
            return false;
        }
        match event {
            TouchEvent::Start(_) if !self.input.is_dragging => {
                if !self.viewport.contains(touch.position) {
                    return false;
                }
                self.input.begin_drag(touch.position);
                self.input.register_click(touch.position);
                self.press(touch.position)
            }
            TouchEvent::Start(_) | TouchEvent::Move(_) if self.input.is_dragging => {
                self.input.move_to(touch.position);
                self.drag(touch.position)
            }
            _ => false,
        }
    }

    fn pinch(&mut self, a: Point, b: Point) -> bool {
        match self.touch.pinch.as_mut() {
            None => {
                self.canvas.end_drawing();
                self.input.end_drag();
                *self.deferred = None;
                self.touch.pinch = PinchGesture::begin(a, b);
                self.touch.pinch.is_some()
            }
            Some(pinch) => {
                let update = pinch.update(a, b, self.thresholds);
                let mut changed = false;
                if let Some((factor, center)) = update.zoom {
                    changed |= self.canvas.zoom_at(self.viewport.client_to_screen(center), factor);
                }
                if let Some(delta) = update.pan {
                    self.canvas.pan(self.viewport.pan_delta(delta));
                    changed = true;
                }
                changed
            }
        }
    }

    fn press(&mut self, position: Point) -> bool {
        let point = self.viewport.client_to_canvas(&self.canvas.camera, position);
        *self.deferred = None;
        if self.input.is_double_click() && self.canvas.begin_text_edit_at(point).is_some() {
            self.input.end_drag();
            return true;
        }
        let tool = self.canvas.tools.current_tool;
        let creates = tool == ToolKind::Pen || tool.shape_kind().is_some();
        if creates && self.canvas.document.text_at(point).is_some() {
            *self.deferred = Some(point);
            return true;
        }
        match tool {
            ToolKind::Pan => true,
            _ => self.canvas.start_drawing(point),
        }
    }

    fn drag(&mut self, position: Point) -> bool {
        match self.canvas.tools.current_tool {
            ToolKind::Pan => {
                let delta = self.viewport.pan_delta(self.input.pointer_delta());
                self.canvas.pan(delta);
                true
            }
            _ => {
                if let Some(start) = self.deferred.take() {
                    self.canvas.start_drawing(start);
                }
                let point = self.viewport.client_to_canvas(&self.canvas.camera, position);
                self.canvas.continue_drawing(point)
            }
        }
    }
}
