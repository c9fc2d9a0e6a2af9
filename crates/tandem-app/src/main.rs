//! Main application entry point.

use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use tandem_app::{App, Script};

#[derive(Parser, Debug)]
#[command(name = "tandem", about = "Replay a two-pane drawing session and export both panes")]
struct Args {
    /// Session script (JSON).
    script: PathBuf,

    /// Where to write the primary pane's PNG.
    primary: PathBuf,

    /// Where to write the secondary pane's PNG.
    secondary: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    log::info!("Starting Tandem with {}", args.script.display());
    let json = std::fs::read_to_string(&args.script)?;
    let script = Script::from_json(&json)?;
    let base_dir = args.script.parent().unwrap_or(Path::new("."));

    let mut app = App::from_script(&script, base_dir)?;
    app.run(&script)?;

    std::fs::write(&args.primary, app.export_primary()?)?;
    log::info!("Wrote {}", args.primary.display());

    if let Some(path) = &args.secondary {
        let surface = app.render_secondary()?;
        tandem_render::save_png(&surface, path)?;
        log::info!("Wrote {}", path.display());
    }

    let ui = app.ui_state();
    log::info!(
        "Done: {} element(s), zoom {:.0}%, undo {}, redo {}",
        app.session().canvas().elements().len(),
        ui.zoom_level * 100.0,
        ui.can_undo,
        ui.can_redo
    );
    Ok(())
}
