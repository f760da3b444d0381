//! HTTP client wrapper with retry logic.
//!
//! Only GET requests are retried, and only on transport errors and 408/5xx.
//! 429 is returned immediately so the router can fall back to its stale
//! tier. Order writes are never retried.

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::AlpacaErrorResponse;
use super::config::{AlpacaConfig, RetryConfig};
use super::error::AlpacaError;
use crate::application::ports::Credentials;

/// Query string pairs.
pub type Query<'a> = [(&'a str, String)];

/// HTTP client for the Alpaca APIs.
#[derive(Debug, Clone)]
pub struct AlpacaHttpClient {
    client: Client,
    trading_base_url: String,
    data_base_url: String,
    retry_config: RetryConfig,
}

impl AlpacaHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AlpacaError::Http(e.to_string()))?;

        Ok(Self {
            client,
            trading_base_url: config.trading_base_url().trim_end_matches('/').to_string(),
            data_base_url: config.data_base_url().trim_end_matches('/').to_string(),
            retry_config: config.retry.clone(),
        })
    }

    /// GET from the trading API.
    pub async fn get<T: DeserializeOwned>(
        &self,
        credentials: &Credentials,
        path: &str,
        query: &Query<'_>,
    ) -> Result<T, AlpacaError> {
        self.request(
            Method::GET,
            &self.trading_base_url,
            credentials,
            path,
            query,
            None::<&()>,
        )
        .await
    }

    /// GET from the market data API.
    pub async fn data_get<T: DeserializeOwned>(
        &self,
        credentials: &Credentials,
        path: &str,
        query: &Query<'_>,
    ) -> Result<T, AlpacaError> {
        self.request(
            Method::GET,
            &self.data_base_url,
            credentials,
            path,
            query,
            None::<&()>,
        )
        .await
    }

    /// POST to the trading API.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        credentials: &Credentials,
        path: &str,
        body: &B,
    ) -> Result<T, AlpacaError> {
        self.request(
            Method::POST,
            &self.trading_base_url,
            credentials,
            path,
            &[],
            Some(body),
        )
        .await
    }

    /// DELETE on the trading API.
    pub async fn delete(&self, credentials: &Credentials, path: &str) -> Result<(), AlpacaError> {
        let _: serde_json::Value = self
            .request(
                Method::DELETE,
                &self.trading_base_url,
                credentials,
                path,
                &[],
                None::<&()>,
            )
            .await?;
        Ok(())
    }

    async fn request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        base_url: &str,
        credentials: &Credentials,
        path: &str,
        query: &Query<'_>,
        body: Option<&B>,
    ) -> Result<T, AlpacaError> {
        let url = format!("{base_url}{path}");
        let idempotent = method == Method::GET;
        let mut backoff = ExponentialBackoff::new(&self.retry_config);

        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .header("APCA-API-KEY-ID", &credentials.api_key)
                .header("APCA-API-SECRET-KEY", &credentials.api_secret);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(b) = body {
                request = request.json(b);
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    let error = if e.is_timeout() {
                        AlpacaError::Timeout
                    } else {
                        AlpacaError::Network(e.to_string())
                    };
                    if idempotent && let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            error = %error,
                            path,
                            delay_ms = delay.as_millis() as u64,
                            attempt = backoff.attempt,
                            "Network error, retrying"
                        );
                        tokio::time::sleep(jittered(delay)).await;
                        continue;
                    }
                    return Err(backoff.exhausted(None, error));
                }
            };

            let status = response.status();

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| AlpacaError::Network(e.to_string()))?;
                let body = if text.trim().is_empty() {
                    "null"
                } else {
                    text.as_str()
                };
                return serde_json::from_str(body)
                    .map_err(|e| AlpacaError::JsonParse(e.to_string()));
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let error_body = response.text().await.unwrap_or_default();

            let (error_code, error_message) =
                match serde_json::from_str::<AlpacaErrorResponse>(&error_body) {
                    Ok(err) => (
                        err.code
                            .map_or_else(|| status.as_u16().to_string(), |c| c.to_string()),
                        err.message,
                    ),
                    Err(_) => (status.as_u16().to_string(), error_body),
                };

            match categorize_status(status) {
                ErrorCategory::RateLimited => {
                    tracing::warn!(path, retry_after_secs = ?retry_after, "Rate limited by Alpaca");
                    return Err(AlpacaError::RateLimited {
                        retry_after_secs: retry_after,
                    });
                }
                ErrorCategory::Retryable => {
                    if idempotent && let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            code = %error_code,
                            message = %error_message,
                            delay_ms = delay.as_millis() as u64,
                            "Retryable error, retrying"
                        );
                        tokio::time::sleep(jittered(delay)).await;
                        continue;
                    }
                    return Err(backoff.exhausted(
                        Some(status.as_u16()),
                        AlpacaError::Api {
                            status: status.as_u16(),
                            code: error_code,
                            message: error_message,
                        },
                    ));
                }
                ErrorCategory::NonRetryable => {
                    return Err(match status {
                        StatusCode::UNAUTHORIZED => AlpacaError::AuthenticationFailed,
                        StatusCode::NOT_FOUND if method == Method::DELETE => {
                            AlpacaError::OrderNotFound {
                                order_id: path.rsplit('/').next().unwrap_or(path).to_string(),
                            }
                        }
                        StatusCode::UNPROCESSABLE_ENTITY => AlpacaError::OrderRejected(error_message),
                        _ => AlpacaError::Api {
                            status: status.as_u16(),
                            code: error_code,
                            message: error_message,
                        },
                    });
                }
            }
        }
    }
}

/// Error category for determining retry behavior.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Scale a delay by a random factor in `[0.5, 1.0]`.
fn jittered(delay: Duration) -> Duration {
    let factor: f64 = rand::rng().random_range(0.5..=1.0);
    delay.mul_f64(factor)
}

/// Exponential backoff calculator.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
        }
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(backoff)
    }

    /// Final error: wrapped when retries were attempted, as-is otherwise.
    fn exhausted(&self, last_status: Option<u16>, error: AlpacaError) -> AlpacaError {
        if self.attempt == 0 {
            return error;
        }
        AlpacaError::MaxRetriesExceeded {
            attempts: self.attempt,
            last_status,
            last_error: error.to_string(),
        }
    }
}
