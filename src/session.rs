//! Per-session display state: the current result, its view mode, and the
//! upload-completion handler that replaces it.

use crate::error::ExportError;
use crate::picker;
use crate::projector;
use crate::types::{DisplayField, ViewMode, DISPLAY_FIELDS};
use crate::upload::{ProgressObserver, Uploader};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Blocking user-facing notification. Returns only once the user has been told.
pub trait Notifier {
    fn alert(&self, message: &str);
}

/// Writes notifications to stderr.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        use std::io::Write;
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}", message);
        let _ = err.flush();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    NoResult,
    Displaying { result: Value, mode: ViewMode },
}

/// What happened to a file selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Nothing was selected.
    Ignored,
    /// The picker refused the file.
    Rejected,
    /// The upload failed; the previous result (if any) is still displayed.
    Failed,
    /// A new result is displayed.
    Completed,
}

pub struct Session<N: Notifier> {
    state: DisplayState,
    file_name: Option<String>,
    spec: &'static [DisplayField],
    notifier: N,
}

impl<N: Notifier> Session<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            state: DisplayState::NoResult,
            file_name: None,
            spec: DISPLAY_FIELDS,
            notifier,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.state {
            DisplayState::Displaying { result, .. } => Some(result),
            DisplayState::NoResult => None,
        }
    }

    pub fn mode(&self) -> Option<ViewMode> {
        match &self.state {
            DisplayState::Displaying { mode, .. } => Some(*mode),
            DisplayState::NoResult => None,
        }
    }

    /// Name of the last selected file, for the "No file selected" line.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Display `result`, replacing whatever was shown. The view mode is kept
    /// when a result is already displayed.
    pub fn receive_result(&mut self, result: Value) {
        let mode = self.mode().unwrap_or_default();
        log::debug!("[session] displaying new result ({:?})", mode);
        self.state = DisplayState::Displaying { result, mode };
    }

    /// Flip between formatted and raw. Returns the new mode, or `None` when
    /// there is nothing displayed.
    pub fn toggle_mode(&mut self) -> Option<ViewMode> {
        match &mut self.state {
            DisplayState::Displaying { mode, .. } => {
                *mode = mode.toggled();
                Some(*mode)
            }
            DisplayState::NoResult => None,
        }
    }

    pub fn set_mode(&mut self, new_mode: ViewMode) {
        if let DisplayState::Displaying { mode, .. } = &mut self.state {
            *mode = new_mode;
        }
    }

    /// Current view text, or `None` when there is no result.
    pub fn render(&self) -> Option<Result<String, serde_json::Error>> {
        match &self.state {
            DisplayState::Displaying { result, mode } => {
                Some(projector::render(result, *mode, self.spec))
            }
            DisplayState::NoResult => None,
        }
    }

    /// Export the current result into `dir`. `Ok(None)` when there is no result.
    pub fn export(&self, dir: &Path) -> Result<Option<PathBuf>, ExportError> {
        match self.result() {
            Some(result) => projector::export_json(result, dir).map(Some),
            None => Ok(None),
        }
    }

    /// Handle a file-picker selection: upload it and display the result, or
    /// notify the user of the failure.
    pub fn on_file_selected(
        &mut self,
        uploader: &Uploader,
        path: Option<&Path>,
        observer: ProgressObserver,
    ) -> SelectionOutcome {
        let file = match picker::select(path) {
            Ok(Some(file)) => file,
            Ok(None) => return SelectionOutcome::Ignored,
            Err(e) => {
                self.notifier.alert(&e.to_string());
                return SelectionOutcome::Rejected;
            }
        };
        self.file_name = Some(file.name.clone());

        match uploader.submit(&file, observer) {
            Ok(result) => {
                self.receive_result(result);
                SelectionOutcome::Completed
            }
            Err(e) => {
                self.notifier.alert(&format!("Upload failed: {}", e));
                SelectionOutcome::Failed
            }
        }
    }
}
