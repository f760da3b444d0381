//! Inbound operations and tagged responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::market::{
    Account, Activity, Bar, BarsQuery, OptionsOrderRequest, Order, OrderRequest, Position, Quote,
};
use crate::domain::options::{ApproxContract, ChainQuery, ChainSnapshot, OptionType, Resolution};

/// Closed set of gateway operations, discriminated by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum GatewayRequest {
    /// Latest quotes.
    Quotes {
        /// Symbols to quote.
        symbols: Vec<String>,
    },
    /// Historical bars.
    Bars(BarsQuery),
    /// Account summary.
    Account,
    /// Open positions.
    Positions,
    /// Account activity.
    Activities,
    /// Recent orders.
    Orders,
    /// Submit an equity or crypto order.
    SubmitOrder(OrderRequest),
    /// Cancel an order.
    #[serde(rename_all = "camelCase")]
    CancelOrder {
        /// Provider order ID.
        order_id: String,
    },
    /// Options chain snapshot.
    OptionsChain(ChainQuery),
    /// Submit an options order.
    SubmitOptionsOrder(OptionsOrderRequest),
    /// Resolve an approximate contract to a real one.
    ResolveContract(ResolveContractQuery),
}

impl GatewayRequest {
    /// Operation name used in logs and metrics.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Quotes { .. } => "quotes",
            Self::Bars(_) => "bars",
            Self::Account => "account",
            Self::Positions => "positions",
            Self::Activities => "activities",
            Self::Orders => "orders",
            Self::SubmitOrder(_) => "submit_order",
            Self::CancelOrder { .. } => "cancel_order",
            Self::OptionsChain(_) => "options_chain",
            Self::SubmitOptionsOrder(_) => "submit_options_order",
            Self::ResolveContract(_) => "resolve_contract",
        }
    }
}

/// Approximate contract picked on a chart, plus its underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveContractQuery {
    /// Underlying symbol.
    pub underlying: String,
    /// Approximate strike.
    pub strike: f64,
    /// Approximate days to expiry.
    pub days_to_expiry: f64,
    /// Call or put.
    #[serde(rename = "type")]
    pub option_type: OptionType,
}

impl ResolveContractQuery {
    /// The approximate contract.
    #[must_use]
    pub const fn approx(&self) -> ApproxContract {
        ApproxContract {
            strike: self.strike,
            days_to_expiry: self.days_to_expiry,
            option_type: self.option_type,
        }
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Live from the primary provider.
    Live,
    /// Fresh cache entry.
    Cached,
    /// Expired cache entry served during a provider failure.
    Stale,
    /// Delayed fallback provider.
    Delayed,
    /// No data could be obtained; the payload is empty.
    Unavailable,
}

impl Provenance {
    /// Label for logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Cached => "cached",
            Self::Stale => "stale",
            Self::Delayed => "delayed",
            Self::Unavailable => "unavailable",
        }
    }

    /// Whether the data should be presented as degraded.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Stale | Self::Delayed | Self::Unavailable)
    }
}

/// Response envelope carrying provenance and an optional degradation note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse<T> {
    /// Payload.
    pub data: T,
    /// Provenance tag.
    pub provenance: Provenance,
    /// Human-readable degradation note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl<T> GatewayResponse<T> {
    /// Response with no note.
    pub const fn new(data: T, provenance: Provenance) -> Self {
        Self {
            data,
            provenance,
            note: None,
        }
    }

    /// Attach a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Map the payload, keeping provenance and note.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GatewayResponse<U> {
        GatewayResponse {
            data: f(self.data),
            provenance: self.provenance,
            note: self.note,
        }
    }
}

/// Acknowledgement of a cancel request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledOrder {
    /// Cancelled order ID.
    pub order_id: String,
    /// Always `true`.
    pub cancelled: bool,
}

/// Payload of any operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// Quotes keyed by symbol.
    Quotes(BTreeMap<String, Quote>),
    /// Bars.
    Bars(Vec<Bar>),
    /// Account.
    Account(Account),
    /// Positions.
    Positions(Vec<Position>),
    /// Activities.
    Activities(Vec<Activity>),
    /// Orders.
    Orders(Vec<Order>),
    /// Submitted order.
    Order(Order),
    /// Cancel acknowledgement.
    Cancelled(CancelledOrder),
    /// Options chain.
    OptionsChain(ChainSnapshot),
    /// Resolved contract.
    Contract(Resolution),
}
