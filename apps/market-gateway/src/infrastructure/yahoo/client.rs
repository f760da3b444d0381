//! Yahoo chart client implementing `FallbackQuoteProvider`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::{Client, StatusCode};

use super::api_types::{ChartResponse, ChartResult};
use crate::application::ports::{FallbackQuoteProvider, ProviderError};
use crate::domain::instrument::classify;
use crate::domain::market::{Bar, BarsQuery, Quote, Timeframe};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; market-gateway)";

/// Configuration for the Yahoo client.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Chart host.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Delayed-quote client over the Yahoo chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooQuoteClient {
    client: Client,
    base_url: String,
}

/// Yahoo ticker for a canonical symbol: `BTC/USD` → `BTC-USD`,
/// `BRK.B` → `BRK-B`.
fn yahoo_symbol(symbol: &str) -> String {
    symbol.replace(['/', '.'], "-")
}

const fn interval(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::OneMinute => "1m",
        Timeframe::FiveMinutes => "5m",
        Timeframe::FifteenMinutes => "15m",
        Timeframe::OneHour => "60m",
        Timeframe::OneDay => "1d",
        Timeframe::OneWeek => "1wk",
    }
}

/// Default lookback; Yahoo caps minute bars at a week of history.
fn lookback(timeframe: Timeframe) -> chrono::Duration {
    match timeframe {
        Timeframe::OneMinute => chrono::Duration::days(5),
        Timeframe::FiveMinutes | Timeframe::FifteenMinutes => chrono::Duration::days(30),
        Timeframe::OneHour => chrono::Duration::days(60),
        Timeframe::OneDay => chrono::Duration::days(365),
        Timeframe::OneWeek => chrono::Duration::days(365 * 5),
    }
}

fn quote_from_chart(symbol: &str, result: &ChartResult) -> Option<Quote> {
    let meta = &result.meta;
    let price = meta.regular_market_price.filter(|p| *p > 0.0)?;
    let previous_close = meta
        .previous_close
        .or(meta.chart_previous_close)
        .unwrap_or(0.0);
    let timestamp = meta
        .regular_market_time
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    Some(
        Quote::new(symbol, classify(symbol), price, previous_close)
            .with_timestamp(timestamp)
            .delayed(),
    )
}

fn bars_from_chart(result: &ChartResult) -> Vec<Bar> {
    let Some(series) = result.indicators.quote.first() else {
        return Vec::new();
    };

    result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, secs)| {
            let at = |values: &[Option<f64>]| values.get(i).copied().flatten();
            Some(Bar {
                time: DateTime::<Utc>::from_timestamp(*secs, 0)?,
                open: at(&series.open)?,
                high: at(&series.high)?,
                low: at(&series.low)?,
                close: at(&series.close)?,
                volume: at(&series.volume).unwrap_or(0.0),
            })
        })
        .collect()
}

impl YahooQuoteClient {
    /// Create a new client.
    pub fn new(config: &YahooConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn chart(
        &self,
        symbol: &str,
        params: &[(&str, String)],
    ) -> Result<ChartResult, ProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, yahoo_symbol(symbol));

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Connection("request timed out".to_string())
                } else {
                    ProviderError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                retry_after_secs: None,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        // Unknown symbols come back as 404 with a populated `chart.error`.
        let parsed = serde_json::from_str::<ChartResponse>(&text);
        if !status.is_success() {
            let body = match parsed.ok().and_then(|r| r.chart.error) {
                Some(err) => format!("{}: {}", err.code, err.description),
                None => text,
            };
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        parsed
            .map_err(|e| ProviderError::Decode(e.to_string()))?
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| ProviderError::Decode(format!("empty chart result for {symbol}")))
    }

    async fn quote(&self, symbol: &str) -> Result<Option<Quote>, ProviderError> {
        let params = [("range", "1d".to_string()), ("interval", "1d".to_string())];
        let result = self.chart(symbol, &params).await?;
        Ok(quote_from_chart(symbol, &result))
    }
}

#[async_trait]
impl FallbackQuoteProvider for YahooQuoteClient {
    async fn delayed_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, ProviderError> {
        let results = join_all(symbols.iter().map(|s| self.quote(s))).await;

        let mut quotes = Vec::with_capacity(symbols.len());
        let mut first_error = None;
        for (symbol, result) in symbols.iter().zip(results) {
            match result {
                Ok(Some(quote)) => quotes.push(quote),
                Ok(None) => tracing::debug!(symbol = %symbol, "No delayed price available"),
                Err(e) => {
                    tracing::debug!(symbol = %symbol, error = %e, "Delayed quote failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        // A partial batch is still an answer; a batch where every symbol
        // failed reports the first failure.
        match first_error {
            Some(e) if quotes.is_empty() => Err(e),
            _ => Ok(quotes),
        }
    }

    async fn delayed_bars(&self, query: &BarsQuery) -> Result<Vec<Bar>, ProviderError> {
        let symbol = query.provider_symbol();
        let end = query.end.unwrap_or_else(Utc::now);
        let start = query
            .start
            .unwrap_or_else(|| end - lookback(query.timeframe));
        let params = [
            ("interval", interval(query.timeframe).to_string()),
            ("period1", start.timestamp().to_string()),
            ("period2", end.timestamp().to_string()),
        ];

        let result = self.chart(&symbol, &params).await?;
        Ok(bars_from_chart(&result))
    }
}
