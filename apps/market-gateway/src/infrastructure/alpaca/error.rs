//! Alpaca-specific error types.

use thiserror::Error;

use crate::application::ports::ProviderError;

/// Errors from the Alpaca adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlpacaError {
    /// HTTP client could not be built or the request could not be formed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// API returned an error.
    #[error("API error {status}: {code} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code from the API.
        code: String,
        /// Error message from the API.
        message: String,
    },

    /// Order was rejected.
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// Authentication failed.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: Option<u64>,
    },

    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Max retries exceeded.
    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Status of the last attempt, if it got a response.
        last_status: Option<u16>,
        /// Last failure.
        last_error: String,
    },

    /// Order not found.
    #[error("Order not found: {order_id}")]
    OrderNotFound {
        /// The order ID that was not found.
        order_id: String,
    },
}

impl From<AlpacaError> for ProviderError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Http(msg) | AlpacaError::Network(msg) => Self::Connection(msg),
            AlpacaError::Timeout => Self::Connection("request timed out".to_string()),
            AlpacaError::JsonParse(msg) => Self::Decode(msg),
            AlpacaError::Api {
                status,
                code,
                message,
            } => Self::Upstream {
                status,
                body: format!("{code}: {message}"),
            },
            AlpacaError::OrderRejected(body) => Self::Upstream { status: 422, body },
            AlpacaError::OrderNotFound { order_id } => Self::Upstream {
                status: 404,
                body: format!("order {order_id} not found"),
            },
            AlpacaError::AuthenticationFailed => Self::Unauthorized,
            AlpacaError::RateLimited { retry_after_secs } => {
                Self::RateLimited { retry_after_secs }
            }
            AlpacaError::MaxRetriesExceeded {
                last_status,
                last_error,
                ..
            } => match last_status {
                Some(status) => Self::Upstream {
                    status,
                    body: last_error,
                },
                None => Self::Connection(last_error),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_become_connection_errors() {
        let err: ProviderError = AlpacaError::Network("connection refused".into()).into();
        assert!(matches!(err, ProviderError::Connection(_)));
        let err: ProviderError = AlpacaError::Timeout.into();
        assert!(err.is_transient());
    }

    #[test]
    fn auth_failure_becomes_unauthorized() {
        let err: ProviderError = AlpacaError::AuthenticationFailed.into();
        assert_eq!(err, ProviderError::Unauthorized);
    }

    #[test]
    fn rejection_keeps_body() {
        let err: ProviderError =
            AlpacaError::OrderRejected("insufficient qty available".into()).into();
        assert_eq!(
            err,
            ProviderError::Upstream {
                status: 422,
                body: "insufficient qty available".into()
            }
        );
    }

    #[test]
    fn exhausted_retries_keep_last_status() {
        let err: ProviderError = AlpacaError::MaxRetriesExceeded {
            attempts: 3,
            last_status: Some(503),
            last_error: "service unavailable".into(),
        }
        .into();
        assert!(matches!(err, ProviderError::Upstream { status: 503, .. }));

        let err: ProviderError = AlpacaError::MaxRetriesExceeded {
            attempts: 3,
            last_status: None,
            last_error: "reset".into(),
        }
        .into();
        assert!(matches!(err, ProviderError::Connection(_)));
    }
}
