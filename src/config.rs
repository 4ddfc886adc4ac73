use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";
const UPLOAD_PATH: &str = "/api/upload";

/// Runtime settings. Built from defaults, `.env`, the environment and CLI flags,
/// in increasing order of precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub endpoint: String,
    /// `None` leaves the HTTP client's default timeout in place.
    pub timeout: Option<Duration>,
    pub export_dir: PathBuf,
}

/// Values given on the command line; each overrides the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub export_dir: Option<PathBuf>,
}

fn load_env() {
    let _ = dotenvy::dotenv();
}

impl Config {
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        load_env();
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Build from an arbitrary variable lookup (the process environment in `load`).
    pub fn from_lookup<F>(lookup: F, overrides: &Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = overrides
            .endpoint
            .clone()
            .or_else(|| lookup("FORM_READER_ENDPOINT"))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = endpoint.trim().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => secs,
            None => match lookup("FORM_READER_TIMEOUT_SECS") {
                Some(raw) if !raw.trim().is_empty() => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?,
                _ => 0,
            },
        };
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let export_dir = overrides
            .export_dir
            .clone()
            .or_else(|| {
                lookup("FORM_READER_EXPORT_DIR")
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from)
            })
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Config {
            endpoint,
            timeout,
            export_dir,
        })
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.endpoint, UPLOAD_PATH)
    }
}
