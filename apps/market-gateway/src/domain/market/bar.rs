//! OHLCV bars.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::instrument::{AssetClass, classify, normalize};

/// A single OHLCV bar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time.
    pub time: DateTime<Utc>,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
}

/// Bar aggregation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    /// One minute.
    #[serde(rename = "1Min")]
    OneMinute,
    /// Five minutes.
    #[serde(rename = "5Min")]
    FiveMinutes,
    /// Fifteen minutes.
    #[serde(rename = "15Min")]
    FifteenMinutes,
    /// One hour.
    #[serde(rename = "1Hour")]
    OneHour,
    /// One day.
    #[default]
    #[serde(rename = "1Day")]
    OneDay,
    /// One week.
    #[serde(rename = "1Week")]
    OneWeek,
}

impl Timeframe {
    /// Brokerage API representation (`1Min`, `1Day`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1Min",
            Self::FiveMinutes => "5Min",
            Self::FifteenMinutes => "15Min",
            Self::OneHour => "1Hour",
            Self::OneDay => "1Day",
            Self::OneWeek => "1Week",
        }
    }

    /// Whether bars are intraday.
    #[must_use]
    pub const fn is_intraday(&self) -> bool {
        matches!(
            self,
            Self::OneMinute | Self::FiveMinutes | Self::FifteenMinutes | Self::OneHour
        )
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1min" | "1m" => Ok(Self::OneMinute),
            "5min" | "5m" => Ok(Self::FiveMinutes),
            "15min" | "15m" => Ok(Self::FifteenMinutes),
            "1hour" | "1h" | "60min" => Ok(Self::OneHour),
            "1day" | "1d" | "day" => Ok(Self::OneDay),
            "1week" | "1w" | "week" => Ok(Self::OneWeek),
            other => Err(format!("unknown timeframe '{other}'")),
        }
    }
}

/// Parameters of a bars request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarsQuery {
    /// Symbol to fetch.
    pub symbol: String,
    /// Aggregation period.
    #[serde(default)]
    pub timeframe: Timeframe,
    /// Inclusive start.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Inclusive end.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// Caller's crypto hint; the classifier is consulted when absent.
    #[serde(default)]
    pub is_crypto: Option<bool>,
}

impl BarsQuery {
    /// Asset class, honouring the caller's hint over the classifier.
    #[must_use]
    pub fn asset_class(&self) -> AssetClass {
        match self.is_crypto {
            Some(true) => AssetClass::Crypto,
            Some(false) => AssetClass::Stock,
            None => classify(&self.symbol),
        }
    }

    /// Symbol in provider form: `BASE/USD` for crypto, uppercased otherwise.
    #[must_use]
    pub fn provider_symbol(&self) -> String {
        let symbol = normalize(&self.symbol);
        if self.asset_class().is_crypto() && !symbol.contains('/') {
            format!("{symbol}/USD")
        } else {
            symbol
        }
    }
}
