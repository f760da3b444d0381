//! Chain snapshots and resolved contracts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Call option.
    Call,
    /// Put option.
    Put,
}

impl OptionType {
    /// API representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Put => "put",
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Greeks for an option.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Greeks {
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

/// Market data for one contract in a chain snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSnapshot {
    /// Best bid.
    pub bid: f64,
    /// Best ask.
    pub ask: f64,
    /// Last trade price.
    pub last: Option<f64>,
    /// Open interest, when the provider reports it.
    pub open_interest: Option<f64>,
    /// Session volume.
    pub volume: Option<f64>,
    /// Greeks.
    pub greeks: Option<Greeks>,
    /// Implied volatility.
    pub implied_volatility: Option<f64>,
}

impl ContractSnapshot {
    /// Mid of the book, falling back to whichever side or last trade exists.
    #[must_use]
    pub fn mid_price(&self) -> f64 {
        match (self.bid > 0.0, self.ask > 0.0) {
            (true, true) => f64::midpoint(self.bid, self.ask),
            (false, true) => self.ask,
            (true, false) => self.bid,
            (false, false) => self.last.unwrap_or(0.0),
        }
    }
}

/// Chain snapshot keyed by OCC identifier.
///
/// Ordered map so iteration order, and therefore resolution, is reproducible.
pub type ChainSnapshot = BTreeMap<String, ContractSnapshot>;

/// Parameters of an options chain request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainQuery {
    /// Underlying symbol.
    pub underlying: String,
    /// Restrict to one expiration date.
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    /// Restrict to calls or puts.
    #[serde(default, rename = "type")]
    pub option_type: Option<OptionType>,
}

/// Contract implied by a chart interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproxContract {
    /// Approximate strike.
    pub strike: f64,
    /// Approximate days until expiry.
    pub days_to_expiry: f64,
    /// Call or put.
    #[serde(rename = "type")]
    pub option_type: OptionType,
}

/// Concrete, tradable contract chosen from a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedContract {
    /// OCC identifier.
    pub occ_symbol: String,
    /// Strike price.
    pub strike: f64,
    /// Expiration date.
    pub expiry_date: NaiveDate,
    /// Days from the resolution date to expiry.
    pub days_to_expiry: i64,
    /// Call or put.
    #[serde(rename = "type")]
    pub option_type: OptionType,
    /// Best bid.
    pub bid: f64,
    /// Best ask.
    pub ask: f64,
    /// Mid price.
    pub mid_price: f64,
    /// Open interest.
    pub open_interest: Option<f64>,
    /// Session volume.
    pub volume: Option<f64>,
    /// Greeks.
    pub greeks: Option<Greeks>,
    /// Implied volatility.
    pub implied_volatility: Option<f64>,
}

/// Result of resolving an approximate contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Resolution {
    /// A real contract of the requested type was found.
    Live(ResolvedContract),
    /// No candidate of the requested type; the request is echoed back.
    NotTradable(ApproxContract),
}

impl Resolution {
    /// Whether the result can be traded.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    /// The resolved contract, if any.
    #[must_use]
    pub const fn contract(&self) -> Option<&ResolvedContract> {
        match self {
            Self::Live(contract) => Some(contract),
            Self::NotTradable(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_price_variants() {
        let both = ContractSnapshot {
            bid: 1.0,
            ask: 1.2,
            ..ContractSnapshot::default()
        };
        assert!((both.mid_price() - 1.1).abs() < 1e-12);

        let last_only = ContractSnapshot {
            last: Some(0.75),
            ..ContractSnapshot::default()
        };
        assert_eq!(last_only.mid_price(), 0.75);
    }

    #[test]
    fn resolution_serializes_with_status_tag() {
        let approx = ApproxContract {
            strike: 100.0,
            days_to_expiry: 30.0,
            option_type: OptionType::Call,
        };
        let json = serde_json::to_value(Resolution::NotTradable(approx)).unwrap();
        assert_eq!(json["status"], "notTradable");
        assert_eq!(json["type"], "call");
    }
}
