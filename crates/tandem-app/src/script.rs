//! Session scripts: a JSON description of a pane layout and the input to replay.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tandem_core::config::{ConfigError, EngineConfig};
use tandem_core::elements::FontFamily;
use tandem_core::input::{PointerEvent, TouchEvent};
use tandem_core::session::{MirrorMode, Pane};
use tandem_core::tools::ToolKind;

/// Size of each pane in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaneSize {
    pub width: f64,
    pub height: f64,
}

impl Default for PaneSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl From<PaneSize> for Size {
    fn from(size: PaneSize) -> Self {
        Size::new(size.width, size.height)
    }
}

/// One scripted user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Pointer event delivered to a pane, in client coordinates.
    Pointer { pane: Pane, event: PointerEvent },
    /// Touch event delivered to a pane, in client coordinates.
    Touch { pane: Pane, event: TouchEvent },
    SetTool { tool: ToolKind },
    /// `#rgb`, `#rrggbb` or `#rrggbbaa`.
    SetColor { color: String },
    SetWidth { width: f64 },
    SetFontSize { size: f64 },
    SetFontFamily { family: FontFamily },
    /// Insert text at a canvas position.
    InsertText { x: f64, y: f64, text: String },
    /// Decode an image file (relative to the script) and insert it at a canvas position.
    InsertImage { path: PathBuf, x: f64, y: f64 },
    /// Replace the text of the element being edited.
    CommitText { text: String },
    CancelText,
    Undo,
    Redo,
    Clear,
    /// Swap the active pane.
    Flip,
    /// Resize both panes.
    Resize { size: PaneSize },
    ResetView,
}

/// A replayable session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Engine tunables. Defaults apply when absent.
    pub config: Option<EngineConfig>,
    pub mode: MirrorMode,
    /// Size of each of the two stacked panes.
    pub viewport: PaneSize,
    /// TrueType/OpenType font for text runs (relative to the script).
    pub font: Option<PathBuf>,
    pub actions: Vec<Action>,
}

impl Script {
    /// Parse a script, validating any embedded config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let script: Self = serde_json::from_str(json)?;
        if let Some(config) = &script.config {
            config.validate()?;
        }
        Ok(script)
    }

    pub fn engine_config(&self) -> EngineConfig {
        self.config.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use tandem_core::input::MouseButton;

    #[test]
    fn test_parse_minimal_script() {
        let script = Script::from_json("{}").unwrap();
        assert_eq!(script.mode, MirrorMode::Shared);
        assert_eq!(script.viewport, PaneSize::default());
        assert!(script.actions.is_empty());
    }

    #[test]
    fn test_parse_actions() {
        let json = r##"{
            "mode": "raster",
            "viewport": {"width": 400, "height": 300},
            "actions": [
                {"action": "set_tool", "tool": "rectangle"},
                {"action": "set_color", "color": "#ff0000"},
                {"action": "pointer", "pane": "primary",
                 "event": {"kind": "down", "position": {"x": 1.0, "y": 2.0}, "button": "left"}},
                {"action": "pointer", "pane": "primary", "event": {"kind": "leave"}},
                {"action": "undo"},
                {"action": "flip"}
            ]
        }"##;
        let script = Script::from_json(json).unwrap();
        assert_eq!(script.mode, MirrorMode::Raster);
        assert_eq!(script.actions.len(), 6);
        assert_eq!(script.actions[0], Action::SetTool { tool: ToolKind::Rectangle });
        assert_eq!(
            script.actions[2],
            Action::Pointer {
                pane: Pane::Primary,
                event: PointerEvent::Down {
                    position: Point::new(1.0, 2.0),
                    button: MouseButton::Left,
                },
            }
        );
        assert_eq!(script.actions[4], Action::Undo);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let json = r#"{"config": {"min_scale": 2.0, "max_scale": 1.0}}"#;
        assert!(matches!(Script::from_json(json), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_action_is_a_parse_error() {
        let json = r#"{"actions": [{"action": "teleport"}]}"#;
        assert!(matches!(Script::from_json(json), Err(ConfigError::Parse(_))));
    }
}
