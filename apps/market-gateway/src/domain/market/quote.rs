//! Quote record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::numbers::change_percent;
use crate::domain::instrument::AssetClass;

/// Normalized quote for a stock or crypto pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Symbol as requested (crypto in `BASE/USD` form).
    pub symbol: String,
    /// Last traded price.
    pub last_price: f64,
    /// Best bid price.
    pub bid_price: f64,
    /// Best ask price.
    pub ask_price: f64,
    /// Bid size.
    pub bid_size: f64,
    /// Ask size.
    pub ask_size: f64,
    /// Absolute change against the previous close.
    pub change: f64,
    /// Percent change against the previous close.
    pub change_percent: f64,
    /// Quote timestamp, when the provider supplied one.
    pub timestamp: Option<DateTime<Utc>>,
    /// Stock or crypto.
    pub asset_type: AssetClass,
    /// Whether the quote comes from the delayed fallback.
    pub delayed: bool,
}

impl Quote {
    /// Create a quote from a last price and the previous session close.
    ///
    /// `change` and `change_percent` are derived here and nowhere else.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        asset_type: AssetClass,
        last_price: f64,
        previous_close: f64,
    ) -> Self {
        let change = if previous_close > 0.0 {
            last_price - previous_close
        } else {
            0.0
        };

        Self {
            symbol: symbol.into(),
            last_price,
            change,
            change_percent: change_percent(change, previous_close),
            asset_type,
            ..Self::default()
        }
    }

    /// Attach top-of-book data.
    #[must_use]
    pub const fn with_book(mut self, bid: f64, ask: f64, bid_size: f64, ask_size: f64) -> Self {
        self.bid_price = bid;
        self.ask_price = ask;
        self.bid_size = bid_size;
        self.ask_size = ask_size;
        self
    }

    /// Attach the provider timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Mark as delayed data.
    #[must_use]
    pub const fn delayed(mut self) -> Self {
        self.delayed = true;
        self
    }

    /// Mid price, or last price when the book is one-sided.
    #[must_use]
    pub fn mid(&self) -> f64 {
        if self.bid_price > 0.0 && self.ask_price > 0.0 {
            f64::midpoint(self.bid_price, self.ask_price)
        } else {
            self.last_price
        }
    }
}
