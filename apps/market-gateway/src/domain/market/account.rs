//! Account, position and activity records.

use serde::{Deserialize, Serialize};

use crate::domain::instrument::AssetClass;

/// Brokerage account summary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account ID.
    pub id: String,
    /// Human-facing account number.
    pub account_number: String,
    /// Account status (ACTIVE, ...).
    pub status: String,
    /// Account currency.
    pub currency: String,
    /// Cash balance.
    pub cash: f64,
    /// Total equity.
    pub equity: f64,
    /// Equity at the previous close.
    pub last_equity: f64,
    /// Buying power.
    pub buying_power: f64,
    /// Portfolio value.
    pub portfolio_value: f64,
    /// Long market value.
    pub long_market_value: f64,
    /// Short market value.
    pub short_market_value: f64,
    /// Day trades in the rolling window.
    pub daytrade_count: i64,
    /// Pattern day trader flag.
    pub pattern_day_trader: bool,
    /// Whether trading is blocked.
    pub trading_blocked: bool,
}

/// Open position.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Symbol as reported by the broker.
    pub symbol: String,
    /// Stock or crypto.
    pub asset_type: AssetClass,
    /// Quantity held (negative when short).
    pub qty: f64,
    /// long / short.
    pub side: String,
    /// Average entry price.
    pub avg_entry_price: f64,
    /// Current price.
    pub current_price: f64,
    /// Market value.
    pub market_value: f64,
    /// Cost basis.
    pub cost_basis: f64,
    /// Unrealized P&L.
    pub unrealized_pl: f64,
    /// Unrealized P&L percent (fraction).
    pub unrealized_plpc: f64,
    /// Intraday change (fraction).
    pub change_today: f64,
}

/// Account activity (fill, dividend, transfer, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Activity ID.
    pub id: String,
    /// Activity type code (FILL, DIV, CSD, ...).
    pub activity_type: String,
    /// Symbol, for trade-related activities.
    pub symbol: Option<String>,
    /// Side, for fills.
    pub side: Option<String>,
    /// Quantity, for fills.
    pub qty: Option<f64>,
    /// Price, for fills.
    pub price: Option<f64>,
    /// Net cash amount, for non-trade activities.
    pub net_amount: Option<f64>,
    /// Transaction time or date as reported.
    pub date: Option<String>,
}
