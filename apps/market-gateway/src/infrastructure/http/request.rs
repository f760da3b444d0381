//! HTTP request DTOs.

use serde::{Deserialize, Serialize};

/// Query string of `GET /api/v1/quotes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotesParams {
    /// Comma-separated symbols, e.g. `AAPL,BTC/USD`.
    #[serde(default)]
    pub symbols: String,
}

impl QuotesParams {
    /// Individual symbols, blanks dropped.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        self.symbols
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_split_and_trimmed() {
        let params = QuotesParams {
            symbols: " AAPL, btc/usd,,MSFT ".to_string(),
        };
        assert_eq!(params.symbols(), vec!["AAPL", "btc/usd", "MSFT"]);
    }

    #[test]
    fn empty_list() {
        assert!(QuotesParams::default().symbols().is_empty());
    }
}
