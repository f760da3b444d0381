//! Provider configuration: Alpaca (primary) and Yahoo (fallback).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::ports::Credentials;
use crate::infrastructure::alpaca::{AlpacaConfig, AlpacaEnvironment, RetryConfig};
use crate::infrastructure::yahoo::YahooConfig;

/// Alpaca configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlpacaSettings {
    /// Default API key. Empty means anonymous callers have no credentials.
    #[serde(default)]
    pub api_key: String,
    /// Default API secret.
    #[serde(default)]
    pub api_secret: String,
    /// Trading environment.
    #[serde(default)]
    pub environment: AlpacaEnvironment,
    /// Trading API base URL override.
    #[serde(default)]
    pub trading_base_url: Option<String>,
    /// Market data API base URL override.
    #[serde(default)]
    pub data_base_url: Option<String>,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// GET retry policy.
    #[serde(default)]
    pub retry: RetrySettings,
    /// Equity data feed.
    #[serde(default = "default_stock_feed")]
    pub stock_feed: String,
    /// Crypto venue location.
    #[serde(default = "default_crypto_location")]
    pub crypto_location: String,
}

impl Default for AlpacaSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            environment: AlpacaEnvironment::default(),
            trading_base_url: None,
            data_base_url: None,
            timeout_secs: default_timeout_secs(),
            retry: RetrySettings::default(),
            stock_feed: default_stock_feed(),
            crypto_location: default_crypto_location(),
        }
    }
}

impl AlpacaSettings {
    /// Adapter configuration.
    #[must_use]
    pub fn to_alpaca_config(&self) -> AlpacaConfig {
        AlpacaConfig {
            environment: self.environment,
            trading_base_url: non_empty(self.trading_base_url.as_deref()),
            data_base_url: non_empty(self.data_base_url.as_deref()),
            timeout: Duration::from_secs(self.timeout_secs),
            retry: self.retry.to_retry_config(),
            stock_feed: self.stock_feed.clone(),
            crypto_location: self.crypto_location.clone(),
        }
    }

    /// Process-wide default credentials, if both halves are set.
    #[must_use]
    pub fn default_credentials(&self) -> Option<Credentials> {
        let credentials = Credentials::new(self.api_key.trim(), self.api_secret.trim());
        (!credentials.is_blank()).then_some(credentials)
    }
}

/// Retry policy for idempotent Alpaca calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff growth factor.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetrySettings {
    /// Client retry configuration.
    #[must_use]
    pub const fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            multiplier: self.multiplier,
        }
    }
}

/// Delayed-quote fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackSettings {
    /// Whether uncredentialed callers and failing quote reads may use it.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Chart host.
    #[serde(default = "default_fallback_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_fallback_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FallbackSettings {
    /// Client configuration.
    #[must_use]
    pub fn to_yahoo_config(&self) -> YahooConfig {
        YahooConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_stock_feed() -> String {
    "iex".to_string()
}

fn default_crypto_location() -> String {
    "us".to_string()
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    2000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_true() -> bool {
    true
}

fn default_fallback_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}
