//! Fallback Quote Provider Port (Driven Port)
//!
//! Uncredentialed, read-only, delayed data. Used when a caller has no
//! primary credentials or the primary is failing.

use async_trait::async_trait;

use super::primary_provider::ProviderError;
use crate::domain::market::{Bar, BarsQuery, Quote};

/// Port for the delayed-quote fallback.
#[async_trait]
pub trait FallbackQuoteProvider: Send + Sync {
    /// Delayed quotes. Symbols the provider cannot answer are omitted rather
    /// than failing the batch.
    async fn delayed_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, ProviderError>;

    /// Delayed bars.
    async fn delayed_bars(&self, query: &BarsQuery) -> Result<Vec<Bar>, ProviderError>;
}
