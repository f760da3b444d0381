//! OCC option symbol parsing.
//!
//! Format: `{ROOT}{YY}{MM}{DD}{C|P}{STRIKE}`
//! - Root: 1-6 characters (the padded OCC form with spaces is accepted)
//! - Date: 6 digits (YYMMDD)
//! - Type: C (call) or P (put)
//! - Strike: 8 digits (strike × 1000)

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use super::contract::OptionType;

/// Identifier that does not match the OCC shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparsable contract identifier: {0}")]
pub struct UnparsableIdentifier(pub String);

/// Decoded OCC option symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccSymbol {
    root: String,
    expiry: NaiveDate,
    option_type: OptionType,
    strike_thousandths: u64,
}

#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn occ_regex() -> &'static regex::Regex {
    static OCC_REGEX: OnceLock<regex::Regex> = OnceLock::new();
    OCC_REGEX.get_or_init(|| {
        regex::Regex::new(r"^([A-Z][A-Z0-9.]{0,5})(\d{2})(\d{2})(\d{2})([CP])(\d{8})$")
            .expect("OCC regex is valid")
    })
}

impl OccSymbol {
    /// Build a symbol from its parts.
    #[must_use]
    pub fn new(
        root: impl Into<String>,
        expiry: NaiveDate,
        option_type: OptionType,
        strike_thousandths: u64,
    ) -> Self {
        Self {
            root: root.into().to_uppercase(),
            expiry,
            option_type,
            strike_thousandths,
        }
    }

    /// Decode an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UnparsableIdentifier`] when the shape or the date is invalid.
    pub fn parse(identifier: &str) -> Result<Self, UnparsableIdentifier> {
        let compact: String = identifier
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        let unparsable = || UnparsableIdentifier(identifier.to_string());

        let caps = occ_regex().captures(&compact).ok_or_else(unparsable)?;
        let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        let year: i32 = field(2).parse().map_err(|_| unparsable())?;
        let month: u32 = field(3).parse().map_err(|_| unparsable())?;
        let day: u32 = field(4).parse().map_err(|_| unparsable())?;
        let expiry = NaiveDate::from_ymd_opt(2000 + year, month, day).ok_or_else(unparsable)?;

        let option_type = if field(5) == "C" {
            OptionType::Call
        } else {
            OptionType::Put
        };
        let strike_thousandths: u64 = field(6).parse().map_err(|_| unparsable())?;

        Ok(Self {
            root: field(1).to_string(),
            expiry,
            option_type,
            strike_thousandths,
        })
    }

    /// Underlying root symbol.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Expiration date.
    #[must_use]
    pub const fn expiry(&self) -> NaiveDate {
        self.expiry
    }

    /// Call or put.
    #[must_use]
    pub const fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Raw strike field (strike × 1000).
    #[must_use]
    pub const fn strike_thousandths(&self) -> u64 {
        self.strike_thousandths
    }

    /// Strike price.
    #[must_use]
    pub fn strike(&self) -> f64 {
        self.strike_thousandths as f64 / 1000.0
    }

    /// Whole days from `as_of` to expiry (negative once expired).
    #[must_use]
    pub fn days_to_expiry(&self, as_of: NaiveDate) -> i64 {
        (self.expiry - as_of).num_days()
    }
}

impl std::fmt::Display for OccSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flag = match self.option_type {
            OptionType::Call => 'C',
            OptionType::Put => 'P',
        };
        write!(
            f,
            "{}{:02}{:02}{:02}{}{:08}",
            self.root,
            self.expiry.year() % 100,
            self.expiry.month(),
            self.expiry.day(),
            flag,
            self.strike_thousandths
        )
    }
}

impl std::str::FromStr for OccSymbol {
    type Err = UnparsableIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_call() {
        let occ = OccSymbol::parse("AAPL250117C00150000").unwrap();
        assert_eq!(occ.root(), "AAPL");
        assert_eq!(occ.expiry(), NaiveDate::from_ymd_opt(2025, 1, 17).unwrap());
        assert_eq!(occ.option_type(), OptionType::Call);
        assert_eq!(occ.strike(), 150.0);
    }

    #[test]
    fn parse_fractional_strike_put() {
        let occ = OccSymbol::parse("SPY250321P00452500").unwrap();
        assert_eq!(occ.option_type(), OptionType::Put);
        assert_eq!(occ.strike(), 452.5);
        assert_eq!(occ.strike_thousandths(), 452_500);
    }

    #[test]
    fn parse_padded_occ_form() {
        let occ = OccSymbol::parse("AAPL  250117C00150000").unwrap();
        assert_eq!(occ.to_string(), "AAPL250117C00150000");
    }

    #[test]
    fn encode_is_lossless() {
        for id in ["GOOGL250221C00150000", "F260116P00012500", "BRK.B251219C00480000"] {
            assert_eq!(OccSymbol::parse(id).unwrap().to_string(), id);
        }
    }

    #[test]
    fn rejects_bad_shapes() {
        for id in [
            "AAPL",
            "AAPL250117X00150000",
            "AAPL250117C0015000",
            "TOOLONGROOT250117C00150000",
            "AAPL251317C00150000",
            "AAPL250230C00150000",
        ] {
            assert_eq!(
                OccSymbol::parse(id),
                Err(UnparsableIdentifier(id.to_string())),
                "{id} should not parse"
            );
        }
    }

    #[test]
    fn days_to_expiry_counts_calendar_days() {
        let occ = OccSymbol::parse("AAPL250117C00150000").unwrap();
        let as_of = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(occ.days_to_expiry(as_of), 7);
    }
}
