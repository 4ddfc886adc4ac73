use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PickError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Unsupported file type (expected an image or PDF): {}", .0.display())]
    Unsupported(PathBuf),
    #[error("Could not read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single upload. The `Display` text is what the user is shown.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("An upload is already in progress.")]
    Busy,
    #[error("Could not read file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request failed with status code {status}{}", body_suffix(.body))]
    Status { status: u16, body: String },
    #[error("Invalid JSON in response: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Could not write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("FORM_READER_ENDPOINT is empty")]
    MissingEndpoint,
    #[error("Invalid timeout {0:?} (expected whole seconds)")]
    InvalidTimeout(String),
}
