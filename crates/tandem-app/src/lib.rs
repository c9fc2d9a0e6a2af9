//! Tandem Application
//!
//! Command-line shell that replays a session script against two face-to-face
//! panes and exports what each pane shows.

mod app;
mod script;

pub use app::{App, AppError, UiState};
pub use script::{Action, PaneSize, Script};
