//! Single-file upload to the OCR backend with progress reporting.

use crate::config::Config;
use crate::error::UploadError;
use crate::types::SelectedFile;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Callback receiving the upload percentage after every change.
pub type ProgressObserver = Arc<dyn Fn(u8) + Send + Sync>;

/// `round(loaded * 100 / total)`, clamped to 0..=100. Zero when `total` is zero.
pub fn percent(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let loaded = loaded.min(total) as u128;
    let total = total as u128;
    ((loaded * 200 + total) / (total * 2)) as u8
}

/// Upload progress in percent. Only rises while a request is in flight.
#[derive(Debug, Default)]
pub struct Progress(AtomicU8);

impl Progress {
    pub fn get(&self) -> u8 {
        self.0.load(Ordering::SeqCst)
    }

    /// Record a transport progress event and return the current percentage.
    pub fn report(&self, loaded: u64, total: u64) -> u8 {
        let pct = percent(loaded, total);
        self.0.fetch_max(pct, Ordering::SeqCst).max(pct)
    }

    pub fn complete(&self) {
        self.0.store(100, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

/// Wraps the file being sent; every read is one progress event.
struct ProgressReader<R> {
    inner: R,
    loaded: u64,
    total: u64,
    progress: Arc<Progress>,
    observer: ProgressObserver,
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.loaded += n as u64;
            let before = self.progress.get();
            let now = self.progress.report(self.loaded, self.total);
            if now != before {
                (self.observer)(now);
            }
        }
        Ok(n)
    }
}

/// Clears the busy flag when the upload finishes, however it finishes.
pub(crate) struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Parse a response body. A body that is itself a JSON string is parsed once more.
pub fn decode_body(body: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str::<Value>(body)? {
        Value::String(inner) => serde_json::from_str(&inner),
        value => Ok(value),
    }
}

/// Sends one file at a time to `POST <endpoint>/api/upload`.
pub struct Uploader {
    client: Client,
    url: String,
    busy: AtomicBool,
    progress: Arc<Progress>,
}

impl Uploader {
    pub fn new(config: &Config) -> Result<Self, UploadError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            url: config.upload_url(),
            busy: AtomicBool::new(false),
            progress: Arc::new(Progress::default()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn progress(&self) -> u8 {
        self.progress.get()
    }

    pub(crate) fn begin(&self) -> Result<BusyGuard<'_>, UploadError> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| UploadError::Busy)?;
        Ok(BusyGuard(&self.busy))
    }

    /// Upload `file` and return the parsed extraction result.
    ///
    /// Fails with [`UploadError::Busy`] if another upload from this instance is
    /// still running. Progress ends at 100 on success and is reset to 0 on failure.
    pub fn submit(
        &self,
        file: &SelectedFile,
        observer: ProgressObserver,
    ) -> Result<Value, UploadError> {
        let _guard = self.begin()?;
        self.progress.reset();
        observer(0);

        let result = self.send(file, observer.clone());
        match &result {
            Ok(_) => {
                self.progress.complete();
                observer(100);
                log::info!("[upload] {} processed", file.name);
            }
            Err(e) => {
                self.progress.reset();
                observer(0);
                log::warn!("[upload] {} failed: {}", file.name, e);
            }
        }
        result
    }

    fn send(&self, file: &SelectedFile, observer: ProgressObserver) -> Result<Value, UploadError> {
        let handle = File::open(&file.path)?;
        let total = handle.metadata()?.len();
        log::info!(
            "[upload] sending {} ({} bytes, {}) to {}",
            file.name,
            total,
            file.mime,
            self.url
        );

        let reader = ProgressReader {
            inner: handle,
            loaded: 0,
            total,
            progress: self.progress.clone(),
            observer,
        };
        let part = Part::reader_with_length(reader, total)
            .file_name(file.name.clone())
            .mime_str(file.mime)?;
        let form = Form::new().part("file", part);

        let response = self.client.post(&self.url).multipart(form).send()?;
        let status = response.status();
        let body = response.text()?;
        log::debug!("[upload] response {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(decode_body(&body)?)
    }
}
