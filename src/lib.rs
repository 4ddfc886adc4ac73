pub mod cli;
pub mod config;
pub mod error;
pub mod picker;
pub mod projector;
pub mod session;
pub mod types;
pub mod upload;

use anyhow::Context;
use clap::Parser;
use cli::{Args, Command, DisplayArgs};
use config::{Config, Overrides};
use session::{SelectionOutcome, Session, StderrNotifier};
use std::io::{self, Write};
use upload::Uploader;

pub use error::{ConfigError, ExportError, PickError, UploadError};
pub use projector::{
    available_fields, build_field_map, export_json, filter_confidence, render_value,
};
pub use types::{DisplayField, Field, FieldMap, ViewMode, DISPLAY_FIELDS};

/// Command-line entry point. Returns `Ok(false)` when a non-interactive run
/// failed after the user has already been notified.
pub fn run() -> anyhow::Result<bool> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = Config::load(&Overrides {
        endpoint: args.endpoint.clone(),
        timeout_secs: args.timeout,
        export_dir: args.export_dir.clone(),
    })?;
    log::debug!("[config] {:?}", config);

    let uploader = Uploader::new(&config).context("Could not create HTTP client")?;
    let mut session = Session::new(StderrNotifier);

    let (display, ok) = match args.command {
        Command::Upload { file, display } => {
            let outcome =
                session.on_file_selected(&uploader, file.as_deref(), cli::terminal_progress());
            let ok = matches!(outcome, SelectionOutcome::Completed | SelectionOutcome::Ignored);
            (display, ok)
        }
        Command::View { file, display } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Could not read {}", file.display()))?;
            let result = upload::decode_body(&text)
                .with_context(|| format!("{} is not a JSON document", file.display()))?;
            session.receive_result(result);
            (display, true)
        }
    };

    present(&mut session, &uploader, &config, &display)?;
    Ok(ok || !display.no_interactive)
}

fn present(
    session: &mut Session<StderrNotifier>,
    uploader: &Uploader,
    config: &Config,
    display: &DisplayArgs,
) -> anyhow::Result<()> {
    session.set_mode(display.initial_mode());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::show(session, &mut out)?;
    if display.export {
        cli::export(session, &config.export_dir, display.open, &mut out)?;
    }
    out.flush()?;

    if !display.no_interactive {
        let stdin = io::stdin();
        cli::interact(
            session,
            uploader,
            &config.export_dir,
            display.open,
            stdin.lock(),
            &mut out,
        )?;
    }
    Ok(())
}
