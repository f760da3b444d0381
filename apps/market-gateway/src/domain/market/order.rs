//! Order requests, order shaping, and order records.
//!
//! Shaping rules:
//! - Crypto orders are good-till-cancelled and never carry bracket legs.
//! - Equity orders are day orders; a stop-loss and/or take-profit turns them
//!   into a bracket (both legs) or one-triggers-other (one leg).
//! - Options orders are day orders without legs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::instrument::{AssetClass, classify, normalize};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

impl OrderSide {
    /// API representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Market order.
    Market,
    /// Limit order.
    Limit,
    /// Stop order.
    Stop,
    /// Stop-limit order.
    StopLimit,
}

impl OrderType {
    /// API representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::Stop => "stop",
            Self::StopLimit => "stop_limit",
        }
    }

    /// Whether a limit price is required.
    #[must_use]
    pub const fn requires_limit_price(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit)
    }

    /// Whether a stop price is required.
    #[must_use]
    pub const fn requires_stop_price(&self) -> bool {
        matches!(self, Self::Stop | Self::StopLimit)
    }
}

/// Time in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    /// Day order.
    Day,
    /// Good till cancelled.
    Gtc,
    /// Immediate or cancel.
    Ioc,
    /// Fill or kill.
    Fok,
}

impl TimeInForce {
    /// API representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Gtc => "gtc",
            Self::Ioc => "ioc",
            Self::Fok => "fok",
        }
    }
}

/// Order validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Symbol missing.
    #[error("symbol is required")]
    MissingSymbol,
    /// Quantity not positive.
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),
    /// Limit price missing for a limit order.
    #[error("{0} orders require a limit price")]
    MissingLimitPrice(&'static str),
    /// Stop price missing for a stop order.
    #[error("{0} orders require a stop price")]
    MissingStopPrice(&'static str),
    /// A price that must be positive is not.
    #[error("{field} must be positive, got {value}")]
    NonPositivePrice {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: Decimal,
    },
}

/// Equity or crypto order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Symbol to trade.
    pub symbol: String,
    /// Quantity (fractional allowed).
    pub qty: Decimal,
    /// Buy or sell.
    pub side: OrderSide,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Limit price.
    #[serde(default)]
    pub limit_price: Option<Decimal>,
    /// Stop price for stop / stop-limit orders.
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    /// Stop-loss leg trigger (equities only).
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    /// Take-profit leg limit (equities only).
    #[serde(default)]
    pub take_profit: Option<Decimal>,
}

/// Bracket legs attached to an equity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketLegs {
    /// Stop-loss trigger price.
    pub stop_loss: Option<Decimal>,
    /// Take-profit limit price.
    pub take_profit: Option<Decimal>,
}

impl BracketLegs {
    /// `bracket` with both legs, `oto` with one.
    #[must_use]
    pub const fn order_class(&self) -> &'static str {
        if self.stop_loss.is_some() && self.take_profit.is_some() {
            "bracket"
        } else {
            "oto"
        }
    }
}

/// Order after the gateway's shaping rules are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderShape {
    /// Symbol in submission form.
    pub symbol: String,
    /// Stock or crypto.
    pub asset_class: AssetClass,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// Bracket legs, equities only.
    pub legs: Option<BracketLegs>,
}

fn ensure_positive(field: &'static str, value: Option<Decimal>) -> Result<(), OrderError> {
    match value {
        Some(v) if v <= Decimal::ZERO => Err(OrderError::NonPositivePrice { field, value: v }),
        _ => Ok(()),
    }
}

fn validate_prices(
    order_type: OrderType,
    limit_price: Option<Decimal>,
    stop_price: Option<Decimal>,
) -> Result<(), OrderError> {
    if order_type.requires_limit_price() && limit_price.is_none() {
        return Err(OrderError::MissingLimitPrice(order_type.as_str()));
    }
    if order_type.requires_stop_price() && stop_price.is_none() {
        return Err(OrderError::MissingStopPrice(order_type.as_str()));
    }
    ensure_positive("limit_price", limit_price)?;
    ensure_positive("stop_price", stop_price)
}

impl OrderRequest {
    /// Create a market order request.
    #[must_use]
    pub fn market(symbol: impl Into<String>, qty: Decimal, side: OrderSide) -> Self {
        Self {
            symbol: symbol.into(),
            qty,
            side,
            order_type: OrderType::Market,
            limit_price: None,
            stop_price: None,
            stop_loss: None,
            take_profit: None,
        }
    }

    /// Create a limit order request.
    #[must_use]
    pub fn limit(
        symbol: impl Into<String>,
        qty: Decimal,
        side: OrderSide,
        limit_price: Decimal,
    ) -> Self {
        Self {
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
            ..Self::market(symbol, qty, side)
        }
    }

    /// Attach bracket legs.
    #[must_use]
    pub const fn with_bracket(
        mut self,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
    ) -> Self {
        self.stop_loss = stop_loss;
        self.take_profit = take_profit;
        self
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.symbol.trim().is_empty() {
            return Err(OrderError::MissingSymbol);
        }
        if self.qty <= Decimal::ZERO {
            return Err(OrderError::NonPositiveQuantity(self.qty));
        }
        validate_prices(self.order_type, self.limit_price, self.stop_price)
    }

    /// Apply the shaping rules.
    ///
    /// Crypto: normalized pair, GTC, legs dropped regardless of input.
    #[must_use]
    pub fn shape(&self) -> OrderShape {
        let asset_class = classify(&self.symbol);

        match asset_class {
            AssetClass::Crypto => OrderShape {
                symbol: normalize(&self.symbol),
                asset_class,
                time_in_force: TimeInForce::Gtc,
                legs: None,
            },
            AssetClass::Stock => {
                let legs = (self.stop_loss.is_some() || self.take_profit.is_some()).then_some(
                    BracketLegs {
                        stop_loss: self.stop_loss,
                        take_profit: self.take_profit,
                    },
                );
                OrderShape {
                    symbol: normalize(&self.symbol),
                    asset_class,
                    time_in_force: TimeInForce::Day,
                    legs,
                }
            }
        }
    }
}

/// Options order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsOrderRequest {
    /// OCC contract identifier.
    pub occ_symbol: String,
    /// Number of contracts.
    pub qty: Decimal,
    /// Buy or sell.
    pub side: OrderSide,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Limit price per contract.
    #[serde(default)]
    pub limit_price: Option<Decimal>,
}

impl OptionsOrderRequest {
    /// Validate the request. Contracts trade in whole units.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.occ_symbol.trim().is_empty() {
            return Err(OrderError::MissingSymbol);
        }
        if self.qty <= Decimal::ZERO || !self.qty.fract().is_zero() {
            return Err(OrderError::NonPositiveQuantity(self.qty));
        }
        validate_prices(self.order_type, self.limit_price, None)
    }
}

/// Normalized order record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Broker order ID.
    pub id: String,
    /// Client order ID.
    pub client_order_id: String,
    /// Symbol.
    pub symbol: String,
    /// Stock or crypto (options contracts report as stock).
    pub asset_type: AssetClass,
    /// Ordered quantity.
    pub qty: f64,
    /// Filled quantity.
    pub filled_qty: f64,
    /// Average fill price.
    pub filled_avg_price: Option<f64>,
    /// Side.
    pub side: String,
    /// Order type.
    pub order_type: String,
    /// Time in force.
    pub time_in_force: String,
    /// Broker status.
    pub status: String,
    /// Order class (simple, bracket, oto).
    pub order_class: Option<String>,
    /// Limit price.
    pub limit_price: Option<f64>,
    /// Stop price.
    pub stop_price: Option<f64>,
    /// Submission time.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Child legs for bracket orders.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legs: Vec<Order>,
}
