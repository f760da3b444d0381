//! Yahoo chart endpoint payloads.

use serde::Deserialize;

/// `/v8/finance/chart/{symbol}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    /// Chart envelope.
    pub chart: ChartEnvelope,
}

/// Result list plus an error slot.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    /// One result per requested symbol.
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    /// Set when the symbol is unknown.
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// Chart error.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    /// Error code, e.g. `Not Found`.
    #[serde(default)]
    pub code: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// A single chart result.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    /// Summary fields.
    pub meta: ChartMeta,
    /// Bar open times, unix seconds.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    /// OHLCV series.
    #[serde(default)]
    pub indicators: Indicators,
}

/// Summary fields for the charted instrument.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    /// Yahoo symbol.
    #[serde(default)]
    pub symbol: String,
    /// Last regular-session price.
    #[serde(default)]
    pub regular_market_price: Option<f64>,
    /// Close before the first bar of the chart range.
    #[serde(default)]
    pub chart_previous_close: Option<f64>,
    /// Previous session close, when reported.
    #[serde(default)]
    pub previous_close: Option<f64>,
    /// Time of the last regular-session price, unix seconds.
    #[serde(default)]
    pub regular_market_time: Option<i64>,
}

/// Indicator series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Indicators {
    /// OHLCV series; Yahoo always wraps it in a one-element list.
    #[serde(default)]
    pub quote: Vec<QuoteSeries>,
}

/// Parallel OHLCV arrays. Gaps are `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteSeries {
    /// Opens.
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    /// Highs.
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    /// Lows.
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    /// Closes.
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    /// Volumes.
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}
