//! Deterministic cache keys.
//!
//! Multi-symbol keys are built from the sorted, deduplicated symbol set so
//! `["MSFT", "AAPL"]` and `["AAPL", "MSFT", "AAPL"]` share an entry.
//! Per-account operations are scoped to the caller.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::application::ports::Caller;
use crate::domain::market::BarsQuery;
use crate::domain::options::ChainQuery;

/// Sorted, deduplicated symbol set joined with commas.
pub fn symbol_set<S: AsRef<str>>(symbols: &[S]) -> String {
    symbols
        .iter()
        .map(|s| s.as_ref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(",")
}

/// Quotes key; delayed quotes are kept apart from live ones.
pub fn quotes<S: AsRef<str>>(symbols: &[S], delayed: bool) -> String {
    let prefix = if delayed { "quotes-delayed" } else { "quotes" };
    format!("{prefix}:{}", symbol_set(symbols))
}

fn bound(value: Option<&DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), |t| t.timestamp().to_string())
}

/// Bars key.
pub fn bars(query: &BarsQuery, delayed: bool) -> String {
    let prefix = if delayed { "bars-delayed" } else { "bars" };
    format!(
        "{prefix}:{}:{}:{}:{}",
        query.provider_symbol(),
        query.timeframe,
        bound(query.start.as_ref()),
        bound(query.end.as_ref())
    )
}

/// Options chain key.
pub fn options_chain(query: &ChainQuery) -> String {
    format!(
        "options:{}:{}:{}",
        query.underlying.trim().to_ascii_uppercase(),
        query
            .expiration_date
            .map_or_else(|| "*".to_string(), |d| d.to_string()),
        query.option_type.map_or("*", |t| t.as_str())
    )
}

/// Per-caller singleton key such as `account` or `orders@alice`.
pub fn scoped(operation: &str, caller: &Caller) -> String {
    format!("{operation}{}", caller.scope())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::options::OptionType;

    #[test]
    fn quotes_key_is_order_insensitive() {
        assert_eq!(
            quotes(&["MSFT", "AAPL", "MSFT"], false),
            quotes(&["AAPL", "MSFT"], false)
        );
        assert_eq!(quotes(&["AAPL"], false), "quotes:AAPL");
        assert_eq!(quotes(&["AAPL"], true), "quotes-delayed:AAPL");
    }

    #[test]
    fn bars_key_uses_provider_symbol() {
        let query = BarsQuery {
            symbol: "btc".into(),
            ..BarsQuery::default()
        };
        assert_eq!(bars(&query, false), "bars:BTC/USD:1Day:-:-");
    }

    #[test]
    fn options_key_wildcards() {
        let query = ChainQuery {
            underlying: "spy".into(),
            expiration_date: None,
            option_type: Some(OptionType::Put),
        };
        assert_eq!(options_chain(&query), "options:SPY:*:put");
    }

    #[test]
    fn scoped_keys() {
        assert_eq!(scoped("account", &Caller::anonymous()), "account");
        assert_eq!(scoped("orders", &Caller::new("alice")), "orders@alice");
    }
}
