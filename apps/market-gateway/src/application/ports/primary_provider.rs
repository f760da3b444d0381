//! Primary Provider Port (Driven Port)
//!
//! Credentialed brokerage: live market data, account state and order entry.
//! Implementations return canonical domain records; wire shapes never leave
//! the adapter.

use async_trait::async_trait;

use super::credentials::Credentials;
use crate::domain::market::{
    Account, Activity, Bar, BarsQuery, OptionsOrderRequest, Order, OrderRequest, Position, Quote,
};
use crate::domain::options::{ChainQuery, ChainSnapshot};

/// Provider port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Credentials rejected by the provider.
    #[error("Provider rejected credentials")]
    Unauthorized,

    /// Provider signalled HTTP 429.
    #[error("Rate limited by provider")]
    RateLimited {
        /// Seconds until the provider accepts requests again, if reported.
        retry_after_secs: Option<u64>,
    },

    /// Non-2xx response.
    #[error("Provider returned HTTP {status}: {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Transport failure or timeout.
    #[error("Provider connection error: {0}")]
    Connection(String),

    /// Response body could not be decoded.
    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Whether the failure is transient and a degraded answer is acceptable.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Connection(_) => true,
            Self::Upstream { status, .. } => *status >= 500,
            Self::Unauthorized | Self::Decode(_) => false,
        }
    }

    /// Short label for metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::RateLimited { .. } => "rate_limited",
            Self::Upstream { .. } => "upstream",
            Self::Connection(_) => "connection",
            Self::Decode(_) => "decode",
        }
    }
}

/// Port for the credentialed primary provider.
#[async_trait]
pub trait PrimaryProvider: Send + Sync {
    /// Latest quotes for equities.
    async fn stock_quotes(
        &self,
        credentials: &Credentials,
        symbols: &[String],
    ) -> Result<Vec<Quote>, ProviderError>;

    /// Latest quotes for crypto pairs (`BASE/USD`).
    async fn crypto_quotes(
        &self,
        credentials: &Credentials,
        symbols: &[String],
    ) -> Result<Vec<Quote>, ProviderError>;

    /// Historical bars in ascending time order.
    async fn bars(
        &self,
        credentials: &Credentials,
        query: &BarsQuery,
    ) -> Result<Vec<Bar>, ProviderError>;

    /// Account summary.
    async fn account(&self, credentials: &Credentials) -> Result<Account, ProviderError>;

    /// Open positions.
    async fn positions(&self, credentials: &Credentials) -> Result<Vec<Position>, ProviderError>;

    /// Recent account activity.
    async fn activities(&self, credentials: &Credentials)
    -> Result<Vec<Activity>, ProviderError>;

    /// Recent orders.
    async fn orders(&self, credentials: &Credentials) -> Result<Vec<Order>, ProviderError>;

    /// Submit an equity or crypto order. The request has already been validated.
    async fn submit_order(
        &self,
        credentials: &Credentials,
        request: &OrderRequest,
    ) -> Result<Order, ProviderError>;

    /// Cancel an open order.
    async fn cancel_order(
        &self,
        credentials: &Credentials,
        order_id: &str,
    ) -> Result<(), ProviderError>;

    /// Options chain snapshot for an underlying.
    async fn options_chain(
        &self,
        credentials: &Credentials,
        query: &ChainQuery,
    ) -> Result<ChainSnapshot, ProviderError>;

    /// Submit a single-leg options order.
    async fn submit_options_order(
        &self,
        credentials: &Credentials,
        request: &OptionsOrderRequest,
    ) -> Result<Order, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors() {
        assert!(ProviderError::RateLimited { retry_after_secs: None }.is_transient());
        assert!(ProviderError::Connection("reset".into()).is_transient());
        assert!(!ProviderError::Unauthorized.is_transient());
        assert!(
            ProviderError::Upstream {
                status: 503,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            !ProviderError::Upstream {
                status: 422,
                body: String::new()
            }
            .is_transient()
        );
    }
}
