//! Alpaca API request and response types.
//!
//! These types map directly to Alpaca's REST API format. Market data
//! numbers arrive as JSON numbers; trading API numbers arrive as strings
//! and are left as strings here for the normalizer to coerce.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Market Data Types
// ============================================================================

/// Latest trade.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeWire {
    /// Price.
    #[serde(default)]
    pub p: f64,
    /// Size.
    #[serde(default)]
    pub s: f64,
    /// Timestamp.
    #[serde(default)]
    pub t: Option<DateTime<Utc>>,
}

/// Latest top-of-book quote.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteWire {
    /// Ask price.
    #[serde(default)]
    pub ap: f64,
    /// Ask size.
    #[serde(default, rename = "as")]
    pub ask_size: f64,
    /// Bid price.
    #[serde(default)]
    pub bp: f64,
    /// Bid size.
    #[serde(default)]
    pub bs: f64,
    /// Timestamp.
    #[serde(default)]
    pub t: Option<DateTime<Utc>>,
}

/// OHLCV bar.
#[derive(Debug, Clone, Deserialize)]
pub struct BarWire {
    /// Open time.
    pub t: DateTime<Utc>,
    /// Open.
    #[serde(default)]
    pub o: f64,
    /// High.
    #[serde(default)]
    pub h: f64,
    /// Low.
    #[serde(default)]
    pub l: f64,
    /// Close.
    #[serde(default)]
    pub c: f64,
    /// Volume.
    #[serde(default)]
    pub v: f64,
}

/// Equity snapshot from `/v2/stocks/snapshots`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshotWire {
    /// Latest trade.
    #[serde(default)]
    pub latest_trade: Option<TradeWire>,
    /// Latest quote.
    #[serde(default)]
    pub latest_quote: Option<QuoteWire>,
    /// Previous session's daily bar.
    #[serde(default)]
    pub prev_daily_bar: Option<BarWire>,
}

/// `/v2/stocks/snapshots` response: symbol → snapshot.
pub type StockSnapshotsResponse = HashMap<String, Option<StockSnapshotWire>>;

/// `/v1beta3/crypto/{loc}/latest/trades` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CryptoTradesResponse {
    /// Symbol → latest trade.
    #[serde(default)]
    pub trades: HashMap<String, TradeWire>,
}

/// `/v1beta3/crypto/{loc}/latest/quotes` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CryptoQuotesResponse {
    /// Symbol → latest quote.
    #[serde(default)]
    pub quotes: HashMap<String, QuoteWire>,
}

/// Multi-symbol bars response (crypto).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultiBarsResponse {
    /// Symbol → bars.
    #[serde(default)]
    pub bars: HashMap<String, Vec<BarWire>>,
    /// Pagination token.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Single-symbol bars response (equities).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BarsResponse {
    /// Bars; `null` when the range is empty.
    #[serde(default)]
    pub bars: Option<Vec<BarWire>>,
    /// Pagination token.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Option greeks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GreeksWire {
    /// Delta.
    pub delta: Option<f64>,
    /// Gamma.
    pub gamma: Option<f64>,
    /// Theta.
    pub theta: Option<f64>,
    /// Vega.
    pub vega: Option<f64>,
    /// Rho.
    pub rho: Option<f64>,
}

/// Daily bar subset used for option volume.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyVolumeWire {
    /// Volume.
    #[serde(default)]
    pub v: f64,
}

/// Option contract snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSnapshotWire {
    /// Latest quote.
    #[serde(default)]
    pub latest_quote: Option<QuoteWire>,
    /// Latest trade.
    #[serde(default)]
    pub latest_trade: Option<TradeWire>,
    /// Greeks.
    #[serde(default)]
    pub greeks: Option<GreeksWire>,
    /// Implied volatility.
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    /// Session bar.
    #[serde(default)]
    pub daily_bar: Option<DailyVolumeWire>,
}

/// `/v1beta1/options/snapshots/{underlying}` response page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionSnapshotsResponse {
    /// OCC symbol → snapshot.
    #[serde(default)]
    pub snapshots: HashMap<String, OptionSnapshotWire>,
    /// Pagination token.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

// ============================================================================
// Trading Types
// ============================================================================

/// Account response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountWire {
    /// Account ID.
    #[serde(default)]
    pub id: String,
    /// Account number.
    #[serde(default)]
    pub account_number: String,
    /// Status.
    #[serde(default)]
    pub status: String,
    /// Currency.
    #[serde(default)]
    pub currency: String,
    /// Cash.
    pub cash: Option<String>,
    /// Equity.
    pub equity: Option<String>,
    /// Equity at previous close.
    pub last_equity: Option<String>,
    /// Buying power.
    pub buying_power: Option<String>,
    /// Portfolio value.
    pub portfolio_value: Option<String>,
    /// Long market value.
    pub long_market_value: Option<String>,
    /// Short market value.
    pub short_market_value: Option<String>,
    /// Day trades in the rolling window.
    #[serde(default)]
    pub daytrade_count: Option<i64>,
    /// Pattern day trader flag.
    #[serde(default)]
    pub pattern_day_trader: Option<bool>,
    /// Trading blocked flag.
    #[serde(default)]
    pub trading_blocked: Option<bool>,
}

/// Position response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionWire {
    /// Symbol.
    #[serde(default)]
    pub symbol: String,
    /// Asset class (`us_equity`, `crypto`, `us_option`).
    #[serde(default)]
    pub asset_class: Option<String>,
    /// Quantity.
    pub qty: Option<String>,
    /// Side (long/short).
    #[serde(default)]
    pub side: String,
    /// Average entry price.
    pub avg_entry_price: Option<String>,
    /// Current price.
    pub current_price: Option<String>,
    /// Market value.
    pub market_value: Option<String>,
    /// Cost basis.
    pub cost_basis: Option<String>,
    /// Unrealized P&L.
    pub unrealized_pl: Option<String>,
    /// Unrealized P&L percent (fraction).
    pub unrealized_plpc: Option<String>,
    /// Change since previous close (fraction).
    pub change_today: Option<String>,
}

/// Order response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderWire {
    /// Broker order ID.
    #[serde(default)]
    pub id: String,
    /// Client order ID.
    #[serde(default)]
    pub client_order_id: String,
    /// Symbol.
    #[serde(default)]
    pub symbol: String,
    /// Asset class.
    #[serde(default)]
    pub asset_class: Option<String>,
    /// Quantity.
    pub qty: Option<String>,
    /// Filled quantity.
    pub filled_qty: Option<String>,
    /// Average fill price.
    pub filled_avg_price: Option<String>,
    /// Side.
    #[serde(default)]
    pub side: String,
    /// Order type.
    #[serde(default, rename = "type")]
    pub order_type: String,
    /// Time in force.
    #[serde(default)]
    pub time_in_force: String,
    /// Status.
    #[serde(default)]
    pub status: String,
    /// Order class (`simple`, `bracket`, `oto`, `oco`).
    #[serde(default)]
    pub order_class: Option<String>,
    /// Limit price.
    pub limit_price: Option<String>,
    /// Stop price.
    pub stop_price: Option<String>,
    /// Submission time.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Child legs of a bracket.
    #[serde(default)]
    pub legs: Option<Vec<OrderWire>>,
}

/// Account activity (trade or non-trade).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityWire {
    /// Activity ID.
    #[serde(default)]
    pub id: String,
    /// Activity type (`FILL`, `DIV`, `TRANS`, ...).
    #[serde(default)]
    pub activity_type: String,
    /// Symbol.
    pub symbol: Option<String>,
    /// Side.
    pub side: Option<String>,
    /// Quantity.
    pub qty: Option<String>,
    /// Fill price.
    pub price: Option<String>,
    /// Net cash amount.
    pub net_amount: Option<String>,
    /// Fill time (trade activities).
    pub transaction_time: Option<String>,
    /// Date (non-trade activities).
    pub date: Option<String>,
}

/// Stop-loss leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopLossLeg {
    /// Trigger price.
    pub stop_price: String,
}

/// Take-profit leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TakeProfitLeg {
    /// Limit price.
    pub limit_price: String,
}

/// Order request for the Alpaca API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlpacaOrderRequest {
    /// Symbol or OCC identifier.
    pub symbol: String,
    /// Quantity.
    pub qty: String,
    /// Order side.
    pub side: String,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: String,
    /// Time in force.
    pub time_in_force: String,
    /// Limit price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<String>,
    /// Stop price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<String>,
    /// Order class, for bracket and OTO orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_class: Option<String>,
    /// Stop-loss leg.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<StopLossLeg>,
    /// Take-profit leg.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<TakeProfitLeg>,
    /// Client order ID.
    pub client_order_id: String,
}

// ============================================================================
// Error Types
// ============================================================================

/// Error response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaErrorResponse {
    /// Error code; numeric on most endpoints.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    /// Error message.
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_snapshot_parses() {
        let json = r#"{
            "AAPL": {
                "latestTrade": {"p": 190.0, "s": 100, "t": "2025-01-02T15:30:00Z"},
                "latestQuote": {"ap": 190.05, "as": 2, "bp": 189.95, "bs": 3, "t": "2025-01-02T15:30:00Z"},
                "prevDailyBar": {"t": "2025-01-01T05:00:00Z", "o": 187, "h": 189, "l": 186, "c": 188.0, "v": 1000}
            }
        }"#;
        let parsed: StockSnapshotsResponse = serde_json::from_str(json).unwrap();
        let snapshot = parsed["AAPL"].as_ref().unwrap();
        assert_eq!(snapshot.latest_trade.as_ref().unwrap().p, 190.0);
        assert_eq!(snapshot.latest_quote.as_ref().unwrap().ask_size, 2.0);
        assert_eq!(snapshot.prev_daily_bar.as_ref().unwrap().c, 188.0);
    }

    #[test]
    fn bars_null_is_accepted() {
        let parsed: BarsResponse =
            serde_json::from_str(r#"{"bars": null, "symbol": "AAPL", "next_page_token": null}"#)
                .unwrap();
        assert!(parsed.bars.is_none());
    }

    #[test]
    fn error_with_numeric_code() {
        let parsed: AlpacaErrorResponse =
            serde_json::from_str(r#"{"code": 40310000, "message": "insufficient buying power"}"#)
                .unwrap();
        assert_eq!(parsed.code.unwrap().to_string(), "40310000");
    }

    #[test]
    fn order_request_omits_absent_legs() {
        let request = AlpacaOrderRequest {
            symbol: "BTC/USD".into(),
            qty: "0.01".into(),
            side: "buy".into(),
            order_type: "market".into(),
            time_in_force: "gtc".into(),
            limit_price: None,
            stop_price: None,
            order_class: None,
            stop_loss: None,
            take_profit: None,
            client_order_id: "c-1".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("stop_loss").is_none());
        assert!(json.get("order_class").is_none());
        assert_eq!(json["type"], "market");
    }
}
