//! Tandem Core Library
//!
//! Platform-agnostic drawing engine for a canvas shared by two viewports:
//! view transform, element model, interaction state machine, eraser,
//! snapshot history and the mirror protocol between the panes.

pub mod camera;
pub mod canvas;
pub mod config;
pub mod decode;
pub mod elements;
pub mod eraser;
pub mod gesture;
pub mod history;
pub mod input;
pub mod mirror;
pub mod raster_history;
pub mod session;
pub mod tools;

pub use camera::{Camera, ViewState, Viewport};
pub use canvas::{Canvas, CanvasDocument, CanvasEvent};
pub use config::{ConfigError, EngineConfig};
pub use decode::{BoxFuture, DecodeError, DecodeTasks, DecodedImage, ImageDecoder, ImageStore, Ticket};
pub use elements::{Element, ElementId, ElementTrait, SerializableColor};
pub use gesture::{PinchGesture, PinchThresholds, PinchUpdate};
pub use history::{History, MAX_UNDO_HISTORY};
pub use input::{InputState, MouseButton, PointerEvent, TouchEvent, TouchPoint};
pub use mirror::{MirrorPlan, RasterMirror, SourceWindow, mirror_transform, source_window};
pub use raster_history::{RasterEntry, RasterHistory, RestoreOutcome, RestoreRequest};
pub use session::{MirrorMode, Pane, PaneInput, Session};
pub use tools::{GestureState, ToolKind, ToolManager};
