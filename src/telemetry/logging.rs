//! Logging configuration and initialization.
//!
//! Supports JSON and pretty-printed formats with an optional file sink.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON structured logging (default for production).
    #[default]
    Json,
    /// Human-readable pretty printing (for development).
    Pretty,
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(LogError::UnknownFormat(other.to_string())),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Filter directive, e.g. `info` or `canary_gateway=debug`.
    pub level: String,
    /// Log file. Logs go to stderr when unset.
    pub output_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
            output_path: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("Unknown log format: {0}")]
    UnknownFormat(String),
    #[error("Failed to open log file: {0}")]
    FileOpen(String),
    #[error("Subscriber already initialized")]
    AlreadyInitialized,
}

/// Install the global tracing subscriber. Call once at startup.
///
/// Both formats write to `output_path` when set; file output is never
/// colored.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LogError::InvalidFilter(e.to_string()))?;
    let file = config.output_path.as_deref().map(open_log_file).transpose()?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match (config.format, file) {
        (LogFormat::Json, Some(file)) => registry
            .with(fmt::layer().json().with_writer(Mutex::new(file)))
            .try_init(),
        (LogFormat::Json, None) => registry.with(fmt::layer().json()).try_init(),
        (LogFormat::Pretty, Some(file)) => registry
            .with(fmt::layer().pretty().with_ansi(false).with_writer(Mutex::new(file)))
            .try_init(),
        (LogFormat::Pretty, None) => registry.with(fmt::layer().pretty()).try_init(),
    };
    installed.map_err(|_| LogError::AlreadyInitialized)
}

fn open_log_file(path: &Path) -> Result<File, LogError> {
    File::create(path).map_err(|e| LogError::FileOpen(format!("{}: {}", path.display(), e)))
}
