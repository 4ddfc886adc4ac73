use crate::session::{Notifier, SelectionOutcome, Session};
use crate::upload::{ProgressObserver, Uploader};
use crate::types::ViewMode;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "form-reader")]
#[command(about = "Upload a scanned form to the OCR backend and review the extracted fields")]
pub struct Args {
    /// Backend base URL (overrides FORM_READER_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds, 0 for the HTTP client default
    /// (overrides FORM_READER_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Directory exports are written to (overrides FORM_READER_EXPORT_DIR)
    #[arg(long, global = true)]
    pub export_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload an image or PDF and show the extracted data
    Upload {
        /// Image or PDF to upload
        file: Option<PathBuf>,
        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Show a previously saved extraction result
    View {
        /// Extraction result JSON file
        file: PathBuf,
        #[command(flatten)]
        display: DisplayArgs,
    },
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct DisplayArgs {
    /// Start in the raw JSON view
    #[arg(long)]
    pub raw: bool,

    /// Export the result as soon as it is displayed
    #[arg(long)]
    pub export: bool,

    /// Open exported files with the system default application
    #[arg(long)]
    pub open: bool,

    /// Exit after displaying instead of reading commands from stdin
    #[arg(long)]
    pub no_interactive: bool,
}

impl DisplayArgs {
    pub fn initial_mode(&self) -> ViewMode {
        if self.raw {
            ViewMode::Raw
        } else {
            ViewMode::Formatted
        }
    }
}

const HELP: &str = "Commands: t = toggle formatted/raw, e = export JSON, \
                    u <file> = upload another file, q = quit";

/// Renders upload progress as a single updating line on stderr.
pub fn terminal_progress() -> ProgressObserver {
    Arc::new(|pct| {
        let mut err = io::stderr().lock();
        let _ = write!(err, "\rUploading… {:>3}%", pct);
        if pct == 100 {
            let _ = writeln!(err);
        }
        let _ = err.flush();
    })
}

/// Print the current view (or the file status line when nothing is displayed).
pub fn show<N: Notifier, W: Write>(session: &Session<N>, out: &mut W) -> io::Result<()> {
    match session.render() {
        Some(Ok(text)) => {
            let title = match session.mode() {
                Some(ViewMode::Raw) => "Extracted Data (raw JSON)",
                _ => "Extracted Data",
            };
            writeln!(out, "{}", title)?;
            write!(out, "{}", text)
        }
        Some(Err(e)) => writeln!(out, "Could not render result: {}", e),
        None => writeln!(out, "{}", session.file_name().unwrap_or("No file selected")),
    }
}

/// Export and report where the file went.
pub fn export<N: Notifier, W: Write>(
    session: &Session<N>,
    dir: &Path,
    open: bool,
    out: &mut W,
) -> io::Result<()> {
    match session.export(dir) {
        Ok(Some(path)) => {
            writeln!(out, "Saved {}", path.display())?;
            if open {
                if let Err(e) = opener::open(&path) {
                    log::warn!("[export] could not open {}: {}", path.display(), e);
                }
            }
        }
        Ok(None) => writeln!(out, "Nothing to export yet.")?,
        Err(e) => session.notifier().alert(&e.to_string()),
    }
    Ok(())
}

/// Read commands from `input` until `q` or end of input.
pub fn interact<N, R, W>(
    session: &mut Session<N>,
    uploader: &Uploader,
    export_dir: &Path,
    open: bool,
    input: R,
    out: &mut W,
) -> io::Result<()>
where
    N: Notifier,
    R: BufRead,
    W: Write,
{
    writeln!(out, "{}", HELP)?;
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };
        match cmd {
            "" => continue,
            "q" | "quit" => break,
            "t" | "toggle" => match session.toggle_mode() {
                Some(_) => show(session, out)?,
                None => writeln!(out, "No result to display.")?,
            },
            "e" | "export" => export(session, export_dir, open, out)?,
            "u" | "upload" => {
                if uploader.is_busy() {
                    writeln!(out, "Processing…")?;
                    continue;
                }
                let path = (!arg.is_empty()).then(|| PathBuf::from(arg));
                let outcome =
                    session.on_file_selected(uploader, path.as_deref(), terminal_progress());
                match outcome {
                    SelectionOutcome::Completed => show(session, out)?,
                    SelectionOutcome::Ignored => writeln!(out, "No file selected")?,
                    SelectionOutcome::Failed | SelectionOutcome::Rejected => {}
                }
            }
            _ => writeln!(out, "{}", HELP)?,
        }
    }
    Ok(())
}
