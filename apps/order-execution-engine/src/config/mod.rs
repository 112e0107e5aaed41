//! Configuration module for the order execution engine.
//!
//! Loads a YAML file with environment variable interpolation, applies the
//! well-known environment overrides and validates the result.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_execution_engine::config::load_config;
//!
//! // Load from default path (config.yaml); defaults when the file is absent
//! let config = load_config(None)?;
//!
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod broadcast;
mod queue;
mod router;
mod server;

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::services::WorkerPoolConfig;

pub use broadcast::BroadcastConfig;
pub use queue::QueueConfig;
pub use router::RouterConfig;
pub use server::ServerConfig;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),

    /// An environment override could not be parsed.
    #[error("Invalid value for environment variable {name}: '{value}'")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// Raw value.
        value: String,
    },
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Queue and worker configuration.
    #[serde(default)]
    pub queue: QueueConfig,
    /// Simulated venue configuration.
    #[serde(default)]
    pub router: RouterConfig,
    /// Broadcast configuration.
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

impl Config {
    /// Worker pool settings derived from the queue and broadcast sections.
    #[must_use]
    pub const fn worker_pool(&self) -> WorkerPoolConfig {
        WorkerPoolConfig {
            concurrency: self.queue.concurrency,
            rate_limit_max: self.queue.rate_limit_max,
            rate_limit_window: self.queue.rate_limit_window(),
            event_channel_capacity: self.broadcast.event_channel_capacity,
        }
    }

    /// Apply `PORT`, `QUEUE_CONCURRENCY`, `RATE_LIMIT_MAX` and
    /// `RATE_LIMIT_DURATION_MS` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable does not parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable does not parse.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = parse_override(&lookup, "PORT")? {
            self.server.http_port = port;
        }
        if let Some(concurrency) = parse_override(&lookup, "QUEUE_CONCURRENCY")? {
            self.queue.concurrency = concurrency;
        }
        if let Some(max) = parse_override(&lookup, "RATE_LIMIT_MAX")? {
            self.queue.rate_limit_max = max;
        }
        if let Some(duration) = parse_override(&lookup, "RATE_LIMIT_DURATION_MS")? {
            self.queue.rate_limit_duration_ms = duration;
        }
        Ok(())
    }
}

fn parse_override<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidEnvVar {
                    name: name.to_string(),
                    value: raw,
                })
        }
        _ => Ok(None),
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// A missing file yields the defaults. Environment overrides are applied
/// after parsing, then the result is validated.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let mut config = match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path, "Config file not found, using defaults");
            Config::default()
        }
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_string(),
                source: e,
            });
        }
    };

    config.apply_env_overrides()?;
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a YAML string (useful for testing).
///
/// Environment overrides are not applied.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let config = parse_config(yaml)?;
    validate_config(&config)?;
    Ok(config)
}

fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    if interpolated.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml_bw::from_str(&interpolated)?)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match cap.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(v)) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Largest accepted backoff base (one hour).
const MAX_BACKOFF_BASE_MS: u64 = 3_600_000;
/// Largest accepted per-window start budget.
const MAX_RATE_LIMIT: usize = 1_000_000;
/// Largest accepted attempt count per job.
const MAX_ATTEMPTS: u32 = 100;
/// Largest accepted channel or buffer capacity.
const MAX_BUFFER: usize = 1 << 20;

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.socket_addr().is_none() {
        return Err(ConfigError::ValidationError(format!(
            "server.bind_address '{}' is not an IP address",
            config.server.bind_address
        )));
    }

    if config.queue.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "queue.concurrency must be at least 1".to_string(),
        ));
    }

    if config.queue.rate_limit_max > 0 && config.queue.rate_limit_duration_ms == 0 {
        return Err(ConfigError::ValidationError(
            "queue.rate_limit_duration_ms must be positive when rate limiting is enabled"
                .to_string(),
        ));
    }

    if config.queue.rate_limit_max > MAX_RATE_LIMIT {
        return Err(ConfigError::ValidationError(format!(
            "queue.rate_limit_max must not exceed {MAX_RATE_LIMIT}"
        )));
    }

    if config.queue.max_attempts == 0 || config.queue.max_attempts > MAX_ATTEMPTS {
        return Err(ConfigError::ValidationError(format!(
            "queue.max_attempts must be between 1 and {MAX_ATTEMPTS}"
        )));
    }

    if config.queue.backoff_base_ms > MAX_BACKOFF_BASE_MS {
        return Err(ConfigError::ValidationError(format!(
            "queue.backoff_base_ms must not exceed {MAX_BACKOFF_BASE_MS}"
        )));
    }

    if config.router.min_latency_ms > config.router.max_latency_ms {
        return Err(ConfigError::ValidationError(
            "router.min_latency_ms must not exceed router.max_latency_ms".to_string(),
        ));
    }

    for (name, value) in [
        ("event_channel_capacity", config.broadcast.event_channel_capacity),
        ("subscriber_buffer", config.broadcast.subscriber_buffer),
    ] {
        if value == 0 || value > MAX_BUFFER {
            return Err(ConfigError::ValidationError(format!(
                "broadcast.{name} must be between 1 and {MAX_BUFFER}"
            )));
        }
    }

    Ok(())
}
