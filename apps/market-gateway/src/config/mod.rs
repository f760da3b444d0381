//! Configuration module for the market gateway.
//!
//! Loads `config.yaml` (or the path in `GATEWAY_CONFIG`), interpolates
//! environment variables and validates the result.
//!
//! # Usage
//!
//! ```rust,ignore
//! use market_gateway::config::load_config;
//!
//! let config = load_config(None)?;
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod cache;
mod observability;
mod providers;
mod server;

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::{CacheSettings, ThrottleSettings};
pub use observability::{LogFormat, LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use providers::{AlpacaSettings, FallbackSettings, RetrySettings};
pub use server::ServerConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG";

/// Config file used when neither an explicit path nor `GATEWAY_CONFIG` is set.
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
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Response cache.
    #[serde(default)]
    pub cache: CacheSettings,
    /// Primary-provider throttle.
    #[serde(default)]
    pub throttle: ThrottleSettings,
    /// Alpaca (primary provider).
    #[serde(default)]
    pub alpaca: AlpacaSettings,
    /// Delayed-quote fallback.
    #[serde(default)]
    pub fallback: FallbackSettings,
    /// Logging and metrics.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to `GATEWAY_CONFIG`,
///   then `config.yaml`.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(
        || std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
        str::to_string,
    );

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. Unset or empty
/// variables without a default become empty strings.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
pub fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |caps: &regex::Captures<'_>| {
        let default_value = caps.get(2).map_or("", |m| m.as_str());
        match std::env::var(&caps[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let cache = &config.cache;
    if cache.fresh_ttl_secs >= cache.stale_ttl_secs {
        return Err(ConfigError::ValidationError(
            "cache.fresh_ttl_secs must be less than cache.stale_ttl_secs".to_string(),
        ));
    }

    if cache.max_entries == 0 {
        return Err(ConfigError::ValidationError(
            "cache.max_entries must be positive".to_string(),
        ));
    }

    if config.server.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "server.request_timeout_secs must be positive".to_string(),
        ));
    }

    let alpaca = &config.alpaca;
    if alpaca.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "alpaca.timeout_secs must be positive".to_string(),
        ));
    }

    if alpaca.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "alpaca.retry.max_attempts must be at least 1".to_string(),
        ));
    }

    if alpaca.retry.multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "alpaca.retry.multiplier must be at least 1.0".to_string(),
        ));
    }

    for (field, url) in [
        ("alpaca.trading_base_url", alpaca.trading_base_url.as_deref()),
        ("alpaca.data_base_url", alpaca.data_base_url.as_deref()),
        ("fallback.base_url", Some(config.fallback.base_url.as_str())),
    ] {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty())
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::ValidationError(format!(
                "{field} must be an http(s) URL, got '{url}'"
            )));
        }
    }

    let metrics = &config.observability.metrics;
    if metrics.enabled && metrics.listen_addr.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::ValidationError(format!(
            "observability.metrics.listen_addr is not a socket address: '{}'",
            metrics.listen_addr
        )));
    }

    Ok(())
}
