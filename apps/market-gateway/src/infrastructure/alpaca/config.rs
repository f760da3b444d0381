//! Alpaca adapter configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment for Alpaca API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlpacaEnvironment {
    /// Paper trading (simulated).
    #[default]
    Paper,
    /// Live trading (real money).
    Live,
}

impl AlpacaEnvironment {
    /// Get the base URL for the trading API.
    #[must_use]
    pub const fn trading_base_url(&self) -> &'static str {
        match self {
            Self::Paper => "https://paper-api.alpaca.markets",
            Self::Live => "https://api.alpaca.markets",
        }
    }

    /// Get the base URL for the market data API.
    #[must_use]
    pub const fn data_base_url(&self) -> &'static str {
        "https://data.alpaca.markets"
    }

    /// Check if this is live trading.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl std::fmt::Display for AlpacaEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paper => write!(f, "PAPER"),
            Self::Live => write!(f, "LIVE"),
        }
    }
}

/// Configuration for the Alpaca adapter.
///
/// Credentials are not part of the adapter configuration; they arrive with
/// each request.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    /// Trading environment.
    pub environment: AlpacaEnvironment,
    /// Trading API base URL override.
    pub trading_base_url: Option<String>,
    /// Market data API base URL override.
    pub data_base_url: Option<String>,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy configuration.
    pub retry: RetryConfig,
    /// Equity data feed (`iex` or `sip`).
    pub stock_feed: String,
    /// Crypto venue location segment (`us`).
    pub crypto_location: String,
}

impl Default for AlpacaConfig {
    fn default() -> Self {
        Self::new(AlpacaEnvironment::Paper)
    }
}

impl AlpacaConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(environment: AlpacaEnvironment) -> Self {
        Self {
            environment,
            trading_base_url: None,
            data_base_url: None,
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
            stock_feed: "iex".to_string(),
            crypto_location: "us".to_string(),
        }
    }

    /// Point both APIs at one host (mock servers).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.trading_base_url = Some(url.clone());
        self.data_base_url = Some(url);
        self
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Get the trading API base URL.
    #[must_use]
    pub fn trading_base_url(&self) -> &str {
        self.trading_base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.trading_base_url())
    }

    /// Get the data API base URL.
    #[must_use]
    pub fn data_base_url(&self) -> &str {
        self.data_base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.data_base_url())
    }
}

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first included.
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }
}
