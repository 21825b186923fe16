//! Configuration management for the docqc runtime
//!
//! Settings come from defaults, an optional TOML file, and `DOCQC_*`
//! environment variables, in that order of precedence (env wins). Call
//! [`Config::validate`] before serving traffic; any error is fatal.

use crate::alerts::AlertConfig;
use crate::metrics::{FileSnapshotConfig, SnapshotConfig};
use crate::review::DEFAULT_RESOLVED_RETENTION;
use crate::routing::RoutingConfig;
use crate::trend::TrendConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("IO error reading config file: {message}")]
    IoError { message: String },

    #[error("Configuration parsing error: {message}")]
    ParseError { message: String },
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API configuration
    pub api: ApiConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Classifier thresholds and TTL table
    pub routing: RoutingConfig,
    /// Rolling trend window
    pub trend: TrendConfig,
    /// Alert thresholds
    pub alerts: AlertConfig,
    /// Review queue settings
    pub review: ReviewConfig,
    /// Background sweep and snapshot export
    pub maintenance: MaintenanceConfig,
}

/// API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API server port
    pub port: u16,
    /// API server host
    pub host: String,
    /// Default page size for `GET review-queue`
    pub default_review_limit: usize,
    /// Upper bound on `limit` for `GET review-queue`
    pub max_review_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            default_review_limit: 50,
            max_review_limit: 200,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

/// Review queue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Resolved items kept for audit
    pub resolved_retention: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            resolved_retention: DEFAULT_RESOLVED_RETENTION,
        }
    }
}

/// Background maintenance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Period of the cache sweep / dashboard refresh
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
    /// Snapshot export after each pass
    pub snapshot: SnapshotConfig,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60),
            snapshot: SnapshotConfig::default(),
        }
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: format!("Cannot parse '{}'", value),
    })
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path.as_ref().display(), e),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// File (if any), then environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `DOCQC_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = env::var("DOCQC_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = env::var("DOCQC_API_PORT") {
            self.api.port = parse_env("DOCQC_API_PORT", &port)?;
        }
        if let Ok(level) = env::var("DOCQC_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Ok(v) = env::var("DOCQC_TTL_HIGH_SECONDS") {
            self.routing.ttl.high_seconds = parse_env("DOCQC_TTL_HIGH_SECONDS", &v)?;
        }
        if let Ok(v) = env::var("DOCQC_TTL_MEDIUM_SECONDS") {
            self.routing.ttl.medium_seconds = parse_env("DOCQC_TTL_MEDIUM_SECONDS", &v)?;
        }
        if let Ok(v) = env::var("DOCQC_TTL_LOW_SECONDS") {
            self.routing.ttl.low_seconds = parse_env("DOCQC_TTL_LOW_SECONDS", &v)?;
        }
        if let Ok(v) = env::var("DOCQC_SAFETY_CRITICAL_FLOOR") {
            self.routing.safety_critical_floor = parse_env("DOCQC_SAFETY_CRITICAL_FLOOR", &v)?;
        }

        if let Ok(v) = env::var("DOCQC_TREND_WINDOW") {
            self.trend.window_size = parse_env("DOCQC_TREND_WINDOW", &v)?;
        }
        if let Ok(v) = env::var("DOCQC_TREND_NOISE_BAND") {
            self.trend.noise_band = parse_env("DOCQC_TREND_NOISE_BAND", &v)?;
        }

        if let Ok(v) = env::var("DOCQC_REVIEW_VOLUME_THRESHOLD") {
            self.alerts.high_review_volume_threshold =
                parse_env("DOCQC_REVIEW_VOLUME_THRESHOLD", &v)?;
        }

        if let Ok(v) = env::var("DOCQC_SWEEP_INTERVAL_SECONDS") {
            let secs: u64 = parse_env("DOCQC_SWEEP_INTERVAL_SECONDS", &v)?;
            self.maintenance.sweep_interval = Duration::from_secs(secs);
        }
        if let Ok(path) = env::var("DOCQC_SNAPSHOT_PATH") {
            let pretty_print = self
                .maintenance
                .snapshot
                .file
                .as_ref()
                .map(|f| f.pretty_print)
                .unwrap_or(true);
            self.maintenance.snapshot.enabled = true;
            self.maintenance.snapshot.file = Some(FileSnapshotConfig {
                path: PathBuf::from(path),
                pretty_print,
            });
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "api.port".to_string(),
                reason: "Port cannot be 0".to_string(),
            });
        }

        if self.api.max_review_limit == 0
            || self.api.default_review_limit == 0
            || self.api.default_review_limit > self.api.max_review_limit
        {
            return Err(ConfigError::InvalidValue {
                key: "api.default_review_limit".to_string(),
                reason: format!(
                    "Must satisfy 1 <= default ({}) <= max ({})",
                    self.api.default_review_limit, self.api.max_review_limit
                ),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                reason: format!("Must be one of: {}", valid_levels.join(", ")),
            });
        }

        self.routing.validate()?;
        self.trend.validate()?;
        self.alerts.validate()?;

        if self.maintenance.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "maintenance.sweep_interval".to_string(),
                reason: "Interval must be > 0".to_string(),
            });
        }

        let snapshot = &self.maintenance.snapshot;
        if snapshot.enabled && snapshot.file.is_none() && !snapshot.log {
            return Err(ConfigError::MissingRequired {
                key: "maintenance.snapshot.file".to_string(),
            });
        }

        Ok(())
    }
}
