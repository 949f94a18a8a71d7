//! Application configuration.
//!
//! Aggregates configuration for the broker connection and every bridge
//! shape into a single Config struct that can be loaded from YAML files or
//! environment variables. Raw values are kept as read; validation happens
//! when a shape is initialized, before any wait cycle runs.

use std::time::Duration;

use serde::Deserialize;

use crate::policy::CallShape;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "courier.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "COURIER_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "COURIER";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "COURIER_LOG";

/// Default inbound channel.
pub const DEFAULT_CHANNEL_IN: &str = "data_in";
/// Default outbound channel.
pub const DEFAULT_CHANNEL_OUT: &str = "data_out";
/// Default time between polls, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 0.01;

/// Configuration errors.
///
/// All of these are fatal and reported at initialization.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unhandled timeout action '{action}' for {shape} (expected one of: {expected})")]
    InvalidTimeoutAction {
        action: String,
        shape: CallShape,
        expected: String,
    },

    #[error("Poll interval must be a positive number of seconds, got {0}")]
    InvalidPollInterval(f64),

    #[error("Timeout must be a finite number of seconds, got {0}")]
    InvalidTimeout(f64),

    #[error("Channel '{0}' must not be empty")]
    EmptyChannel(&'static str),

    #[error("No outbound channel configured")]
    MissingChannelOut,
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker connection.
    pub broker: BrokerConfig,
    /// Listen-only shape (reader).
    pub listener: ListenerConfig,
    /// Call shape (filter).
    pub call: CallConfig,
    /// Fire-and-forget publishing (writer).
    pub broadcast: BroadcastConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `courier.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Broker connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Host running the broker.
    pub host: String,
    /// Port the broker listens on.
    pub port: u16,
    /// Logical database index.
    pub db: i64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
        }
    }
}

impl BrokerConfig {
    /// Connection URL for the broker.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Listen-only shape configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Channel (pattern) to receive data on.
    pub channel_in: String,
    /// Seconds to wait for data to arrive; 0 or negative waits forever.
    pub timeout_secs: f64,
    /// Seconds between polls.
    pub poll_interval_secs: f64,
    /// Action to take when a timeout occurs (`keep-waiting`, `stop`).
    pub timeout_action: String,
    /// Prefix for generated record names.
    pub prefix: String,
    /// Extension appended to generated record names.
    pub extension: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            channel_in: DEFAULT_CHANNEL_IN.to_string(),
            timeout_secs: 30.0,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            timeout_action: "keep-waiting".to_string(),
            prefix: String::new(),
            extension: String::new(),
        }
    }
}

/// Call shape configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CallConfig {
    /// Channel (pattern) to receive responses on.
    pub channel_in: String,
    /// Channel to send requests out on.
    pub channel_out: String,
    /// Seconds to wait for a response; 0 or negative waits forever.
    pub timeout_secs: f64,
    /// Seconds between polls.
    pub poll_interval_secs: f64,
    /// Action to take when a timeout occurs (`drop`, `input`).
    pub timeout_action: String,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            channel_in: DEFAULT_CHANNEL_IN.to_string(),
            channel_out: DEFAULT_CHANNEL_OUT.to_string(),
            timeout_secs: 5.0,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            timeout_action: "drop".to_string(),
        }
    }
}

/// Broadcast writer configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Channel to broadcast on.
    pub channel_out: String,
    /// Whether to include the raw data in broadcast records.
    pub include_data: bool,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            channel_out: DEFAULT_CHANNEL_OUT.to_string(),
            include_data: false,
        }
    }
}

/// Convert a timeout in seconds; 0 or negative means "wait forever".
pub fn timeout_from_secs(secs: f64) -> Result<Option<Duration>, ConfigError> {
    if !secs.is_finite() {
        return Err(ConfigError::InvalidTimeout(secs));
    }
    if secs <= 0.0 {
        return Ok(None);
    }
    Duration::try_from_secs_f64(secs)
        .map(Some)
        .map_err(|_| ConfigError::InvalidTimeout(secs))
}

/// Convert a poll interval in seconds; must be finite and positive.
pub fn poll_interval_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::InvalidPollInterval(secs));
    }
    match Duration::try_from_secs_f64(secs) {
        Ok(interval) if !interval.is_zero() => Ok(interval),
        _ => Err(ConfigError::InvalidPollInterval(secs)),
    }
}

/// Reject empty channel names.
pub fn require_channel(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyChannel(name));
    }
    Ok(())
}
