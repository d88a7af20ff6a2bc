//! Gateway configuration.
//!
//! Loaded from `CANARY_GATEWAY_*` environment variables or a TOML file.
//! Environment values that are missing or invalid fall back to defaults
//! without crashing; file values are validated strictly.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `CANARY_GATEWAY_MODEL_NAME` | `default` | Model name passed to the store |
//! | `CANARY_GATEWAY_DEFAULT_VERSION` | `latest` | Version loaded at startup |
//! | `CANARY_GATEWAY_CANARY_PROBABILITY` | 0.0 | Initial canary share, `[0, 1]` |
//! | `CANARY_GATEWAY_LOAD_TIMEOUT_MS` | 0 | Store load deadline (0 = none) |
//! | `CANARY_GATEWAY_ROUTING_SEED` | unset | Seed for reproducible routing |
//! | `CANARY_GATEWAY_LOG_LEVEL` | `info` | Tracing filter directive |
//! | `CANARY_GATEWAY_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `CANARY_GATEWAY_LOG_FILE` | unset | Log file (stderr when unset) |
//! | `CANARY_GATEWAY_REQUIRE_CANARY_LOADED` | false | Readiness needs a loaded canary |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::error::ValidationError;
use crate::models::{CanaryProbability, VersionId};
use crate::telemetry::{LogConfig, LogFormat};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(#[from] ValidationError),
}

/// Effective gateway configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub model_name: String,
    pub default_version: VersionId,
    pub canary_probability: CanaryProbability,
    pub load_timeout: Option<Duration>,
    pub routing_seed: Option<u64>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
    pub require_canary_loaded: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            model_name: "default".to_string(),
            default_version: VersionId::latest(),
            canary_probability: CanaryProbability::NEVER,
            load_timeout: None,
            routing_seed: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            log_file: None,
            require_canary_loaded: false,
        }
    }
}

/// On-disk layout; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    model_name: Option<String>,
    default_version: Option<VersionId>,
    canary_probability: Option<f64>,
    load_timeout_ms: Option<u64>,
    routing_seed: Option<u64>,
    log_level: Option<String>,
    log_format: Option<LogFormat>,
    log_file: Option<PathBuf>,
    require_canary_loaded: Option<bool>,
}

impl GatewayConfig {
    /// Parse a TOML document. Unset keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(text)?;
        let defaults = Self::default();

        let canary_probability = match file.canary_probability {
            Some(p) => CanaryProbability::new(p)?,
            None => defaults.canary_probability,
        };

        Ok(Self {
            model_name: file.model_name.unwrap_or(defaults.model_name),
            default_version: file.default_version.unwrap_or(defaults.default_version),
            canary_probability,
            load_timeout: file
                .load_timeout_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            routing_seed: file.routing_seed,
            log_level: file.log_level.unwrap_or(defaults.log_level),
            log_format: file.log_format.unwrap_or(defaults.log_format),
            log_file: file.log_file,
            require_canary_loaded: file
                .require_canary_loaded
                .unwrap_or(defaults.require_canary_loaded),
        })
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            format: self.log_format,
            level: self.log_level.clone(),
            output_path: self.log_file.clone(),
        }
    }
}

/// Read and parse a TOML config file.
pub fn load_file(path: impl AsRef<Path>) -> Result<GatewayConfig, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    GatewayConfig::from_toml_str(&text)
}

/// Parse an env var, returning `None` on missing or invalid.
fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}

/// Non-empty string env var.
fn string_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

/// Load configuration from environment variables.
///
/// Missing or invalid values fall back to defaults without panicking; an
/// out-of-range probability falls back to 0.
pub fn load() -> GatewayConfig {
    let defaults = GatewayConfig::default();

    let canary_probability = parse_env::<f64>("CANARY_GATEWAY_CANARY_PROBABILITY")
        .and_then(|p| CanaryProbability::new(p).ok())
        .unwrap_or(defaults.canary_probability);
    let load_timeout = parse_env::<u64>("CANARY_GATEWAY_LOAD_TIMEOUT_MS")
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis);

    GatewayConfig {
        model_name: string_env("CANARY_GATEWAY_MODEL_NAME").unwrap_or(defaults.model_name),
        default_version: string_env("CANARY_GATEWAY_DEFAULT_VERSION")
            .and_then(|v| v.parse::<VersionId>().ok())
            .unwrap_or(defaults.default_version),
        canary_probability,
        load_timeout,
        routing_seed: parse_env::<u64>("CANARY_GATEWAY_ROUTING_SEED"),
        log_level: string_env("CANARY_GATEWAY_LOG_LEVEL").unwrap_or(defaults.log_level),
        log_format: parse_env::<LogFormat>("CANARY_GATEWAY_LOG_FORMAT")
            .unwrap_or(defaults.log_format),
        log_file: string_env("CANARY_GATEWAY_LOG_FILE").map(PathBuf::from),
        require_canary_loaded: parse_env::<bool>("CANARY_GATEWAY_REQUIRE_CANARY_LOADED")
            .unwrap_or(defaults.require_canary_loaded),
    }
}
