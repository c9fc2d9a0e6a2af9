//! Tool selection and the per-gesture interaction state.

use crate::config::EngineConfig;
use crate::elements::{ElementId, FontFamily, SerializableColor, ShapeKind};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Pen,
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Eraser,
    /// Single-pointer drags move the view instead of drawing.
    Pan,
}

impl ToolKind {
    /// The shape this tool draws, if it is a shape tool.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Ellipse => Some(ShapeKind::Ellipse),
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Arrow => Some(ShapeKind::Arrow),
            ToolKind::Pen | ToolKind::Eraser | ToolKind::Pan => None,
        }
    }

    /// Whether pointer drags with this tool mutate the element store.
    pub fn draws(self) -> bool {
        !matches!(self, ToolKind::Pan)
    }
}

/// State of the interaction state machine.
///
/// At most one element is under construction at a time. Erasing never
/// creates an element, so it has its own state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    /// Waiting for a gesture.
    #[default]
    Idle,
    /// An element is being drawn.
    Active(ElementId),
    /// An erase drag is in progress.
    Erasing,
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    /// The element under construction, if any.
    pub fn active_element(&self) -> Option<ElementId> {
        match self {
            GestureState::Active(id) => Some(*id),
            _ => None,
        }
    }
}

/// Manages the current tool and the style applied to new elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Color for new strokes, shapes and text.
    pub color: SerializableColor,
    /// Width for new strokes and shapes.
    pub width: f64,
    /// Eraser radius in canvas units.
    pub eraser_radius: f64,
    /// Font size for new text.
    pub font_size: f64,
    /// Font family for new text.
    pub font_family: FontFamily,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            current_tool: ToolKind::default(),
            color: config.default_color,
            width: config.default_width,
            eraser_radius: config.eraser_radius,
            font_size: config.default_font_size,
            font_family: FontFamily::default(),
        }
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.color = color;
    }

    /// Set the stroke width. Non-positive widths are ignored.
    pub fn set_width(&mut self, width: f64) {
        if width > 0.0 && width.is_finite() {
            self.width = width;
        }
    }
}
