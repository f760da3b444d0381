//! Nearest-contract resolution.
//!
//! Maps a user's approximate `(strike, days to expiry, type)` onto the
//! closest real contract of the same type:
//!
//! ```text
//! strike_distance = |real_strike - approx_strike| / underlying_price
//! time_distance   = |real_dte - approx_dte| / 45
//! distance        = 2 * strike_distance + time_distance
//! ```
//!
//! Ties go to the smaller strike distance, then the lexicographically
//! smallest identifier.

use std::cmp::Ordering;

use chrono::NaiveDate;

use super::contract::{ApproxContract, ChainSnapshot, Resolution, ResolvedContract};
use super::occ::OccSymbol;

/// Weight of strike proximity relative to time proximity.
pub const STRIKE_WEIGHT: f64 = 2.0;

/// Days that count as one unit of time distance.
pub const TIME_SCALE_DAYS: f64 = 45.0;

/// Resolver bound to a valuation date and underlying price.
#[derive(Debug, Clone, Copy)]
pub struct ContractResolver {
    as_of: NaiveDate,
    underlying_price: f64,
}

struct Candidate<'a> {
    id: &'a str,
    occ: OccSymbol,
    strike_distance: f64,
    distance: f64,
}

impl Candidate<'_> {
    fn cmp_rank(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.strike_distance.total_cmp(&other.strike_distance))
            .then_with(|| self.id.cmp(other.id))
    }
}

impl ContractResolver {
    /// Create a resolver.
    #[must_use]
    pub const fn new(as_of: NaiveDate, underlying_price: f64) -> Self {
        Self {
            as_of,
            underlying_price,
        }
    }

    /// Strike normalizer. Without a usable underlying price the approximate
    /// strike stands in so distances stay finite.
    fn price_scale(&self, approx: &ApproxContract) -> f64 {
        if self.underlying_price > 0.0 {
            self.underlying_price
        } else {
            approx.strike.abs().max(1.0)
        }
    }

    /// Resolve `approx` against `chain`.
    ///
    /// Unparsable identifiers are skipped. Only contracts of the requested
    /// type are considered; with none available the approximate contract is
    /// returned as [`Resolution::NotTradable`].
    #[must_use]
    pub fn resolve(&self, approx: &ApproxContract, chain: &ChainSnapshot) -> Resolution {
        let scale = self.price_scale(approx);

        let best = chain
            .keys()
            .filter_map(|id| match OccSymbol::parse(id) {
                Ok(occ) => Some((id.as_str(), occ)),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping chain entry");
                    None
                }
            })
            .filter(|(_, occ)| occ.option_type() == approx.option_type)
            .map(|(id, occ)| {
                let strike_distance = (occ.strike() - approx.strike).abs() / scale;
                let time_distance =
                    (occ.days_to_expiry(self.as_of) as f64 - approx.days_to_expiry).abs()
                        / TIME_SCALE_DAYS;
                Candidate {
                    id,
                    occ,
                    strike_distance,
                    distance: STRIKE_WEIGHT * strike_distance + time_distance,
                }
            })
            .min_by(Candidate::cmp_rank);

        let Some(best) = best else {
            return Resolution::NotTradable(*approx);
        };

        let snapshot = chain.get(best.id).cloned().unwrap_or_default();

        tracing::debug!(
            occ_symbol = best.id,
            distance = best.distance,
            "Resolved approximate contract"
        );

        Resolution::Live(ResolvedContract {
            occ_symbol: best.id.to_string(),
            strike: best.occ.strike(),
            expiry_date: best.occ.expiry(),
            days_to_expiry: best.occ.days_to_expiry(self.as_of),
            option_type: best.occ.option_type(),
            bid: snapshot.bid,
            ask: snapshot.ask,
            mid_price: snapshot.mid_price(),
            open_interest: snapshot.open_interest,
            volume: snapshot.volume,
            greeks: snapshot.greeks,
            implied_volatility: snapshot.implied_volatility,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::options::{ContractSnapshot, OptionType};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    fn chain(ids: &[&str]) -> ChainSnapshot {
        ids.iter()
            .map(|id| {
                (
                    (*id).to_string(),
                    ContractSnapshot {
                        bid: 1.0,
                        ask: 1.2,
                        ..ContractSnapshot::default()
                    },
                )
            })
            .collect()
    }

    fn approx(strike: f64, days: f64, option_type: OptionType) -> ApproxContract {
        ApproxContract {
            strike,
            days_to_expiry: days,
            option_type,
        }
    }

    #[test]
    fn never_matches_other_type() {
        // Puts only, call requested
        let chain = chain(&["SPY250117P00450000", "SPY250131P00460000"]);
        let request = approx(455.0, 20.0, OptionType::Call);

        let result = ContractResolver::new(as_of(), 455.0).resolve(&request, &chain);

        assert_eq!(result, Resolution::NotTradable(request));
        assert!(!result.is_live());
    }

    #[test]
    fn nearer_expiry_wins_at_equal_strike() {
        // Jan 17 is 15 days out, Feb 21 is 50 days out; approx is 20 days
        let chain = chain(&["SPY250221C00450000", "SPY250117C00450000"]);
        let request = approx(450.0, 20.0, OptionType::Call);

        let result = ContractResolver::new(as_of(), 450.0).resolve(&request, &chain);

        let contract = result.contract().unwrap();
        assert_eq!(contract.occ_symbol, "SPY250117C00450000");
        assert_eq!(contract.days_to_expiry, 15);
    }

    #[test]
    fn strike_weighs_double() {
        // A: 1% strike miss, exact expiry → 0.02
        // B: exact strike, 2 day miss → 0.044
        let chain = chain(&["XYZ250117C00101000", "XYZ250119C00100000"]);
        let request = approx(100.0, 15.0, OptionType::Call);

        let result = ContractResolver::new(as_of(), 100.0).resolve(&request, &chain);

        assert_eq!(result.contract().unwrap().occ_symbol, "XYZ250117C00101000");
    }

    #[test]
    fn symmetric_tie_prefers_smallest_identifier() {
        let chain = chain(&["SPY250117C00460000", "SPY250117C00440000"]);
        let request = approx(450.0, 15.0, OptionType::Call);

        let result = ContractResolver::new(as_of(), 450.0).resolve(&request, &chain);

        assert_eq!(result.contract().unwrap().occ_symbol, "SPY250117C00440000");
    }

    #[test]
    fn unparsable_entries_are_skipped() {
        let chain = chain(&["garbage", "SPY250117C00450000"]);
        let request = approx(450.0, 15.0, OptionType::Call);

        let result = ContractResolver::new(as_of(), 450.0).resolve(&request, &chain);

        assert_eq!(result.contract().unwrap().occ_symbol, "SPY250117C00450000");
    }

    #[test]
    fn resolved_contract_carries_market_data() {
        let chain = chain(&["SPY250117P00450000"]);
        let request = approx(449.0, 14.0, OptionType::Put);

        let result = ContractResolver::new(as_of(), 450.0).resolve(&request, &chain);

        let contract = result.contract().unwrap();
        assert_eq!(contract.strike, 450.0);
        assert_eq!(contract.option_type, OptionType::Put);
        assert!((contract.mid_price - 1.1).abs() < 1e-12);
    }

    #[test]
    fn zero_underlying_price_stays_finite() {
        let chain = chain(&["SPY250117C00450000"]);
        let request = approx(450.0, 15.0, OptionType::Call);

        let result = ContractResolver::new(as_of(), 0.0).resolve(&request, &chain);

        assert!(result.is_live());
    }

    #[test]
    fn empty_chain_is_not_tradable() {
        let request = approx(450.0, 15.0, OptionType::Call);
        let result = ContractResolver::new(as_of(), 450.0).resolve(&request, &ChainSnapshot::new());
        assert!(!result.is_live());
    }
}
