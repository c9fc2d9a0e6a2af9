//! Application shell: owns the session and the output side of both panes.

use crate::script::{Action, Script};
use ab_glyph::FontArc;
use image::RgbaImage;
use kurbo::{Point, Size};
use std::path::{Path, PathBuf};
use tandem_core::camera::Viewport;
use tandem_core::canvas::CanvasEvent;
use tandem_core::config::{ConfigError, EngineConfig};
use tandem_core::decode::{DecodeError, ImageDecoder};
use tandem_core::elements::SerializableColor;
use tandem_core::mirror::RasterMirror;
use tandem_core::session::{MirrorMode, Pane, Session};
use tandem_render::{
    ImageCrateDecoder, MirrorRenderer, RasterRenderer, RendererError, export_png, flatten_over_white,
    render_viewport, render_viewport_snapshot,
};
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("Image rejected: {0}")]
    Decode(#[from] DecodeError),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// State mirrored into the UI (toolbar buttons, zoom label).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UiState {
    pub can_undo: bool,
    pub can_redo: bool,
    pub zoom_level: f64,
    /// Number of committed history changes observed.
    pub history_changes: usize,
}

/// The application.
pub struct App {
    session: Session,
    decoder: ImageCrateDecoder,
    font: Option<FontArc>,
    base_dir: PathBuf,
    mirror: RasterMirror,
    mirror_renderer: MirrorRenderer,
    ui_state: UiState,
}

impl App {
    /// Create an app with two stacked panes of `pane_size`.
    pub fn new(config: &EngineConfig, mode: MirrorMode, pane_size: Size) -> Self {
        let session = Session::face_to_face(config, mode, pane_size);
        Self {
            session,
            decoder: ImageCrateDecoder::new(),
            font: None,
            base_dir: PathBuf::from("."),
            mirror: RasterMirror::new(pane_size, pane_size),
            mirror_renderer: MirrorRenderer::new(),
            ui_state: UiState {
                zoom_level: 1.0,
                ..UiState::default()
            },
        }
    }

    /// Build an app for `script`, resolving relative paths against `base_dir`.
    pub fn from_script(script: &Script, base_dir: &Path) -> Result<Self, AppError> {
        let mut app = Self::new(&script.engine_config(), script.mode, script.viewport.into());
        app.base_dir = base_dir.to_path_buf();
        if let Some(font) = &script.font {
            app.font = Some(load_font_file(&app.base_dir.join(font))?);
        }
        Ok(app)
    }

    /// Replay every action of `script`.
    ///
    /// Rejected image decodes are logged and skipped; every other error aborts.
    pub fn run(&mut self, script: &Script) -> Result<(), AppError> {
        log::info!("Replaying {} action(s) in {:?} mode", script.actions.len(), self.session.mode());
        for action in &script.actions {
            match self.apply(action) {
                Ok(()) => {}
                Err(AppError::Decode(e)) => log::warn!("Image insert rejected: {}", e),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn ui_state(&self) -> UiState {
        self.ui_state
    }

    /// Apply one action.
    pub fn apply(&mut self, action: &Action) -> Result<(), AppError> {
        let result = self.dispatch(action);
        self.process_events();
        result
    }

    fn dispatch(&mut self, action: &Action) -> Result<(), AppError> {
        match action {
            Action::Pointer { pane, event } => {
                match self.session.input(*pane) {
                    Some(mut input) => {
                        input.pointer(event);
                    }
                    None => log::debug!("Pointer event on inactive {:?} pane ignored", pane),
                }
            }
            Action::Touch { pane, event } => {
                match self.session.input(*pane) {
                    Some(mut input) => {
                        input.touch(event);
                    }
                    None => log::debug!("Touch event on inactive {:?} pane ignored", pane),
                }
            }
            Action::SetTool { tool } => self.session.canvas_mut().set_tool(*tool),
            Action::SetColor { color } => {
                let parsed = SerializableColor::from_hex(color).ok_or_else(|| AppError::InvalidColor(color.clone()))?;
                self.session.canvas_mut().tools.set_color(parsed);
            }
            Action::SetWidth { width } => self.session.canvas_mut().tools.set_width(*width),
            Action::SetFontSize { size } => {
                if *size > 0.0 && size.is_finite() {
                    self.session.canvas_mut().tools.font_size = *size;
                }
            }
            Action::SetFontFamily { family } => self.session.canvas_mut().tools.font_family = *family,
            Action::InsertText { x, y, text } => {
                self.session.canvas_mut().insert_text(Point::new(*x, *y), text.clone());
            }
            Action::InsertImage { path, x, y } => self.insert_image(path, Point::new(*x, *y))?,
            Action::CommitText { text } => {
                self.session.canvas_mut().commit_text_edit(text.clone());
            }
            Action::CancelText => self.session.canvas_mut().cancel_text_edit(),
            Action::Undo => {
                self.session.canvas_mut().undo();
            }
            Action::Redo => {
                self.session.canvas_mut().redo();
            }
            Action::Clear => self.session.canvas_mut().clear(),
            Action::Flip => {
                self.session.flip_roles();
            }
            Action::Resize { size } => self.resize((*size).into()),
            Action::ResetView => {
                let canvas = self.session.canvas_mut();
                canvas.camera.reset();
                self.mirror.update_view(canvas.camera.view_state());
                self.ui_state.zoom_level = canvas.camera.scale;
            }
        }
        Ok(())
    }

    fn insert_image(&mut self, path: &Path, position: Point) -> Result<(), AppError> {
        let bytes = std::fs::read(self.base_dir.join(path))?;
        let canvas = self.session.canvas_mut();
        let ticket = canvas.begin_image_insert();
        let decoded = pollster::block_on(self.decoder.decode(bytes));
        if let Some(id) = canvas.finish_image_insert(ticket, decoded, position)? {
            log::info!("Inserted image {} from {}", id, path.display());
        }
        Ok(())
    }

    fn resize(&mut self, size: Size) {
        let primary = Viewport::new(Point::ZERO, size);
        let rotated = self.session.viewport(Pane::Secondary).rotated;
        let secondary = Viewport::new(Point::new(0.0, size.height), size).rotated(rotated);
        self.session.set_viewport(Pane::Primary, primary);
        self.session.set_viewport(Pane::Secondary, secondary);
        self.mirror.set_source_size(size);
        self.mirror.resize(size);
    }

    /// Drain canvas notifications into the UI state and the raster mirror.
    fn process_events(&mut self) {
        for event in self.session.canvas_mut().drain_events() {
            match event {
                CanvasEvent::HistoryChanged { can_undo, can_redo, .. } => {
                    self.ui_state.can_undo = can_undo;
                    self.ui_state.can_redo = can_redo;
                    self.ui_state.history_changes += 1;
                }
                CanvasEvent::ViewChanged(view) => {
                    self.ui_state.zoom_level = view.scale;
                    self.mirror.update_view(view);
                }
            }
        }
    }

    /// PNG of the primary pane over white.
    pub fn export_primary(&self) -> Result<Vec<u8>, AppError> {
        let canvas = self.session.canvas();
        Ok(export_png(canvas, self.session.viewport(Pane::Primary), self.font.as_ref())?)
    }

    /// Current pixels of the secondary pane.
    ///
    /// In shared mode this renders the canvas through the secondary viewport;
    /// in raster mode it crops and rotates a fresh snapshot of the primary's pixels.
    pub fn render_secondary(&mut self) -> Result<RgbaImage, AppError> {
        match self.session.mode() {
            MirrorMode::Shared => {
                let mut surface = render_viewport(
                    self.session.canvas(),
                    self.session.viewport(Pane::Secondary),
                    self.font.as_ref(),
                )?;
                flatten_over_white(&mut surface);
                Ok(surface)
            }
            MirrorMode::Raster => {
                let canvas = self.session.canvas();
                let primary = self.session.viewport(Pane::Primary);
                let frame = render_viewport_snapshot(canvas, primary, self.font.as_ref())?;
                self.mirror
                    .update_frame_with(frame, primary.display_transform(&canvas.camera));
                let plan = self.mirror.plan().ok_or(RendererError::InvalidSize {
                    width: self.mirror.target().width as u32,
                    height: self.mirror.target().height as u32,
                })?;
                Ok(self.mirror_renderer.render(&plan)?.clone())
            }
        }
    }
}

fn load_font_file(path: &Path) -> Result<FontArc, AppError> {
    let bytes = std::fs::read(path)?;
    log::info!("Loaded font {} ({} bytes)", path.display(), bytes.len());
    Ok(RasterRenderer::load_font(bytes)?)
}
