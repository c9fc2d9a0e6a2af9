//! Canvas document and the interaction state machine.

use crate::camera::{Camera, ViewState};
use crate::config::EngineConfig;
use crate::decode::{DecodeError, DecodeTasks, DecodedImage, ImageStore, Ticket};
use crate::elements::{Element, ElementId, ElementTrait, Image, Shape, Stroke, Text};
use crate::eraser;
use crate::history::History;
use crate::tools::{GestureState, ToolKind, ToolManager};
use kurbo::{Point, Vec2};

/// The ordered element list plus its undo/redo history.
///
/// List order is render order (back to front).
#[derive(Debug, Clone)]
pub struct CanvasDocument {
    elements: Vec<Element>,
    history: History<Vec<Element>>,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::with_history_limit(crate::history::MAX_UNDO_HISTORY)
    }

    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            elements: Vec::new(),
            history: History::with_limit(limit),
        }
    }

    /// Push current state to undo stack (call before making changes).
    pub fn push_undo(&mut self) {
        self.history.push(self.elements.clone());
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        let current = std::mem::take(&mut self.elements);
        match self.history.undo(current) {
            Ok(snapshot) => {
                self.elements = snapshot;
                true
            }
            Err(current) => {
                self.elements = current;
                false
            }
        }
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        let current = std::mem::take(&mut self.elements);
        match self.history.redo(current) {
            Ok(snapshot) => {
                self.elements = snapshot;
                true
            }
            Err(current) => {
                self.elements = current;
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drop both stacks.
    pub fn reset_history(&mut self) {
        self.history.reset();
    }

    pub fn history(&self) -> &History<Vec<Element>> {
        &self.history
    }

    /// Append an element on top.
    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id() == id)?;
        Some(self.elements.remove(index))
    }

    /// Remove all elements (no history entry).
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id() == id)
    }

    /// Elements in render order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Run one eraser pass. Returns how many elements were removed.
    pub fn erase_at(&mut self, point: Point, radius: f64) -> usize {
        eraser::erase(&mut self.elements, point, radius)
    }

    /// Topmost text element whose box contains `point`.
    pub fn text_at(&self, point: Point) -> Option<ElementId> {
        self.elements
            .iter()
            .rev()
            .filter_map(Element::as_text)
            .find(|t| {
                let b = t.bounds();
                point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
            })
            .map(|t| t.id())
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Serialize the element list to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.elements)
    }

    /// Parse an element list from JSON.
    pub fn elements_from_json(json: &str) -> Result<Vec<Element>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Notifications for the UI shell, drained with [`Canvas::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// The committed element list changed.
    HistoryChanged {
        snapshot: Vec<Element>,
        can_undo: bool,
        can_redo: bool,
    },
    /// The view transform changed.
    ViewChanged(ViewState),
}

/// Runtime canvas state: document, view and the interaction state machine.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// The document being edited.
    pub document: CanvasDocument,
    /// Camera for view transform.
    pub camera: Camera,
    /// Tool manager.
    pub tools: ToolManager,
    gesture: GestureState,
    editing: Option<ElementId>,
    images: ImageStore,
    image_tasks: DecodeTasks,
    events: Vec<CanvasEvent>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            document: CanvasDocument::with_history_limit(config.history_limit),
            camera: Camera::from_config(config),
            tools: ToolManager::from_config(config),
            gesture: GestureState::Idle,
            editing: None,
            images: ImageStore::new(),
            image_tasks: DecodeTasks::new(),
            events: Vec::new(),
        }
    }

    pub fn elements(&self) -> &[Element] {
        self.document.elements()
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    /// Whether a draw or erase gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        !self.gesture.is_idle()
    }

    /// The element under construction, if any.
    pub fn active_element(&self) -> Option<&Element> {
        self.gesture.active_element().and_then(|id| self.document.get(id))
    }

    pub fn can_undo(&self) -> bool {
        self.document.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.document.can_redo()
    }

    /// Set the current tool. Finalizes any gesture in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.end_drawing();
        self.tools.set_tool(tool);
    }

    /// Serialize the current element list for the UI shell.
    pub fn elements_to_json(&self) -> Result<String, serde_json::Error> {
        self.document.to_json()
    }

    /// Parse an element list produced by [`elements_to_json`](Self::elements_to_json).
    pub fn elements_from_json(json: &str) -> Result<Vec<Element>, serde_json::Error> {
        CanvasDocument::elements_from_json(json)
    }

    /// Take the queued notifications.
    pub fn drain_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Interaction state machine ---------------------------------------

    /// Begin a gesture at a canvas point.
    ///
    /// Pushes the pre-gesture snapshot, then creates a stroke or shape, or
    /// runs the first eraser pass. Returns `false` for tools that do not draw.
    pub fn start_drawing(&mut self, point: Point) -> bool {
        let tool = self.tools.current_tool;
        if !tool.draws() {
            return false;
        }
        self.end_drawing();
        self.document.push_undo();

        match tool {
            ToolKind::Pen => {
                let stroke = Stroke::new(point, self.tools.color, self.tools.width);
                let id = stroke.id();
                self.document.add_element(Element::Stroke(stroke));
                self.gesture = GestureState::Active(id);
            }
            ToolKind::Eraser => {
                let removed = self.document.erase_at(point, self.tools.eraser_radius);
                log::debug!("Erase pass at ({:.1}, {:.1}) removed {}", point.x, point.y, removed);
                self.gesture = GestureState::Erasing;
            }
            _ => {
                let Some(kind) = tool.shape_kind() else {
                    return false;
                };
                let shape = Shape::new(kind, point, self.tools.color, self.tools.width);
                let id = shape.id();
                self.document.add_element(Element::Shape(shape));
                self.gesture = GestureState::Active(id);
            }
        }
        log::debug!("Gesture started with {:?}", tool);
        true
    }

    /// Feed one sampled pointer position to the current gesture.
    pub fn continue_drawing(&mut self, point: Point) -> bool {
        match self.gesture {
            GestureState::Idle => false,
            GestureState::Erasing => {
                self.document.erase_at(point, self.tools.eraser_radius);
                true
            }
            GestureState::Active(id) => match self.document.get_mut(id) {
                Some(Element::Stroke(stroke)) => {
                    stroke.add_point(point);
                    true
                }
                Some(Element::Shape(shape)) => {
                    shape.set_end(point);
                    true
                }
                // The active element vanished or cannot grow: finalize.
                _ => {
                    self.gesture = GestureState::Idle;
                    false
                }
            },
        }
    }

    /// Finalize the current gesture. No-op when idle.
    pub fn end_drawing(&mut self) -> bool {
        if self.gesture.is_idle() {
            return false;
        }
        log::debug!("Gesture finalized: {:?}", self.gesture);
        self.gesture = GestureState::Idle;
        self.emit_history();
        true
    }

    // --- Direct insertion -------------------------------------------------

    /// Insert a text element with the current style.
    pub fn insert_text(&mut self, position: Point, text: impl Into<String>) -> ElementId {
        self.end_drawing();
        self.document.push_undo();
        let text = Text::new(position, text.into(), self.tools.color, self.tools.font_size)
            .with_family(self.tools.font_family);
        let id = text.id();
        self.document.add_element(Element::Text(text));
        self.emit_history();
        id
    }

    /// Reserve a ticket for an image decode that will be inserted later.
    pub fn begin_image_insert(&mut self) -> Ticket {
        self.image_tasks.issue()
    }

    /// Complete an image insert started with [`begin_image_insert`](Self::begin_image_insert).
    ///
    /// Returns `Ok(None)` when the request went stale (the canvas was cleared
    /// or history was restored meanwhile), and the decode error when decoding
    /// failed. In both cases elements and history are untouched.
    pub fn finish_image_insert(
        &mut self,
        ticket: Ticket,
        decoded: Result<DecodedImage, DecodeError>,
        position: Point,
    ) -> Result<Option<ElementId>, DecodeError> {
        if !self.image_tasks.complete(ticket) {
            log::warn!("Dropping stale image decode #{}", ticket.seq());
            return Ok(None);
        }
        let decoded = decoded.inspect_err(|e| log::warn!("Image decode #{} failed: {}", ticket.seq(), e))?;

        self.end_drawing();
        let (width, height) = (decoded.width() as f64, decoded.height() as f64);
        let image_ref = self.images.insert(decoded);
        self.document.push_undo();
        let image = Image::new(image_ref, position, width, height);
        let id = image.id();
        self.document.add_element(Element::Image(image));
        self.emit_history();
        Ok(Some(id))
    }

    // --- Text editing -----------------------------------------------------

    /// Enter text editing for the topmost text element at `point`.
    pub fn begin_text_edit_at(&mut self, point: Point) -> Option<ElementId> {
        let id = self.document.text_at(point)?;
        self.end_drawing();
        self.editing = Some(id);
        Some(id)
    }

    /// The text element being edited, if any.
    pub fn editing(&self) -> Option<ElementId> {
        self.editing
    }

    /// Replace the edited element's text. Returns `false` when nothing is being edited.
    pub fn commit_text_edit(&mut self, text: impl Into<String>) -> bool {
        let Some(id) = self.editing.take() else {
            return false;
        };
        if self.document.get(id).and_then(Element::as_text).is_none() {
            return false;
        }
        self.document.push_undo();
        if let Some(t) = self.document.get_mut(id).and_then(Element::as_text_mut) {
            t.text = text.into();
        }
        self.emit_history();
        true
    }

    pub fn cancel_text_edit(&mut self) {
        self.editing = None;
    }

    // --- History ----------------------------------------------------------

    /// Remove every element. Undoable.
    pub fn clear(&mut self) {
        self.end_drawing();
        self.editing = None;
        self.image_tasks.cancel_all();
        self.document.push_undo();
        self.document.clear();
        log::info!("Canvas cleared");
        self.emit_history();
    }

    pub fn undo(&mut self) -> bool {
        self.end_drawing();
        self.editing = None;
        self.image_tasks.cancel_all();
        let done = self.document.undo();
        if done {
            self.emit_history();
        }
        done
    }

    pub fn redo(&mut self) -> bool {
        self.end_drawing();
        self.editing = None;
        self.image_tasks.cancel_all();
        let done = self.document.redo();
        if done {
            self.emit_history();
        }
        done
    }

    /// Forget all undo/redo snapshots, keeping the current elements.
    pub fn reset_history(&mut self) {
        self.document.reset_history();
        self.emit_history();
    }

    // --- View ---------------------------------------------------------------

    /// Pan by a camera-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        self.camera.pan(delta);
        self.emit_view();
    }

    /// Zoom by `factor` about a camera-space point.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        let changed = self.camera.zoom_at(screen_point, factor);
        if changed {
            self.emit_view();
        }
        changed
    }

    /// One wheel step about a camera-space point.
    pub fn zoom_step(&mut self, delta_sign: f64, screen_point: Point) -> bool {
        let changed = self.camera.zoom_step(delta_sign, screen_point);
        if changed {
            self.emit_view();
        }
        changed
    }

    fn emit_history(&mut self) {
        self.events.push(CanvasEvent::HistoryChanged {
            snapshot: self.document.elements().to_vec(),
            can_undo: self.document.can_undo(),
            can_redo: self.document.can_redo(),
        });
    }

    fn emit_view(&mut self) {
        self.events.push(CanvasEvent::ViewChanged(self.camera.view_state()));
    }
}
