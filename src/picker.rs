//! File selection, restricted to images and PDF.
//!
//! This is the only place the accepted types are enforced; the uploader sends
//! whatever it is given and leaves rejection to the backend.

use crate::error::PickError;
use crate::types::SelectedFile;
use std::path::Path;

/// Extension -> MIME type accepted by the picker (`image/*`, `application/pdf`).
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("avif", "image/avif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("jfif", "image/jpeg"),
    ("pjpeg", "image/jpeg"),
    ("apng", "image/apng"),
];

/// MIME type for a path, if the picker accepts it.
pub fn accepted_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ACCEPTED_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Select a file. `None` (the picker was dismissed) yields `Ok(None)`.
pub fn select(path: Option<&Path>) -> Result<Option<SelectedFile>, PickError> {
    let Some(path) = path else {
        log::debug!("picker dismissed without a selection");
        return Ok(None);
    };
    if path.as_os_str().is_empty() {
        return Ok(None);
    }
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PickError::NotFound(path.to_path_buf())
        } else {
            PickError::Io(e)
        }
    })?;
    if !metadata.is_file() {
        return Err(PickError::NotFound(path.to_path_buf()));
    }
    let mime = accepted_mime(path).ok_or_else(|| PickError::Unsupported(path.to_path_buf()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string();
    Ok(Some(SelectedFile {
        path: path.to_path_buf(),
        name,
        mime,
    }))
}
