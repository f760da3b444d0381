//! Gateway error taxonomy.
//!
//! Every failure reaching a caller is one of these variants and is rendered
//! as an [`ErrorPayload`] with a message and, where one helps, a hint.

use serde::{Deserialize, Serialize};

use crate::application::ports::ProviderError;
use crate::domain::market::OrderError;

/// Errors surfaced by the request router.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Operation needs primary-provider credentials and none are usable.
    #[error("Credentials required for {operation}")]
    CredentialsRequired {
        /// Operation that was refused.
        operation: String,
    },

    /// Credentials contain characters that suggest a copy-paste mistake.
    #[error("Malformed credentials: {field} contains whitespace, quotes or control characters")]
    MalformedCredentials {
        /// Offending field.
        field: &'static str,
    },

    /// Provider returned a non-2xx response.
    #[error("Upstream error (HTTP {status}): {body}")]
    UpstreamError {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Provider signalled rate limiting.
    #[error("Rate limited by upstream provider")]
    RateLimited,

    /// Transport failure or timeout.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Options contract identifier did not decode.
    #[error("Unparsable contract identifier: {0}")]
    UnparsableIdentifier(String),

    /// Request failed validation before reaching a provider.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Structured error body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Error message.
    pub error: String,
    /// Suggested remedy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl GatewayError {
    /// Credentials-required error for `operation`.
    pub fn credentials_required(operation: impl Into<String>) -> Self {
        Self::CredentialsRequired {
            operation: operation.into(),
        }
    }

    /// Whether a read may be answered with stale or default data instead.
    ///
    /// Upstream 5xx counts as transient; 4xx is the caller's problem and is
    /// surfaced. Trading operations never consult this.
    #[must_use]
    pub const fn is_degradable(&self) -> bool {
        match self {
            Self::RateLimited | Self::ConnectionError(_) => true,
            Self::UpstreamError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::CredentialsRequired { .. } => 401,
            Self::MalformedCredentials { .. }
            | Self::UnparsableIdentifier(_)
            | Self::InvalidRequest(_) => 400,
            Self::RateLimited => 429,
            Self::UpstreamError { .. } => 502,
            Self::ConnectionError(_) => 503,
        }
    }

    /// Remedy to show alongside the message.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::CredentialsRequired { .. } => Some(
                "Configure Alpaca API credentials to enable account and trading features"
                    .to_string(),
            ),
            Self::MalformedCredentials { .. } => Some(
                "Re-enter the key and secret without surrounding spaces or quotes".to_string(),
            ),
            Self::RateLimited => Some("Wait a few seconds and retry".to_string()),
            Self::ConnectionError(_) => {
                Some("The provider is unreachable; try again shortly".to_string())
            }
            Self::UpstreamError { .. }
            | Self::UnparsableIdentifier(_)
            | Self::InvalidRequest(_) => None,
        }
    }

    /// Structured payload.
    #[must_use]
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.to_string(),
            hint: self.hint(),
        }
    }

    /// Convert a provider failure for `operation`.
    pub fn from_provider(operation: &str, error: ProviderError) -> Self {
        match error {
            ProviderError::Unauthorized => Self::credentials_required(operation),
            ProviderError::RateLimited { .. } => Self::RateLimited,
            ProviderError::Upstream { status, body } => Self::UpstreamError { status, body },
            ProviderError::Connection(message) => Self::ConnectionError(message),
            ProviderError::Decode(message) => Self::UpstreamError {
                status: 502,
                body: message,
            },
        }
    }
}

impl From<OrderError> for GatewayError {
    fn from(error: OrderError) -> Self {
        Self::InvalidRequest(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(GatewayError::credentials_required("account"), 401)]
    #[test_case(GatewayError::MalformedCredentials { field: "api_key" }, 400)]
    #[test_case(GatewayError::InvalidRequest("x".into()), 400)]
    #[test_case(GatewayError::RateLimited, 429)]
    #[test_case(GatewayError::UpstreamError { status: 422, body: String::new() }, 502)]
    #[test_case(GatewayError::ConnectionError("reset".into()), 503)]
    fn status_codes(error: GatewayError, expected: u16) {
        assert_eq!(error.status_code(), expected);
    }

    #[test]
    fn credentials_payload_has_hint() {
        let payload = GatewayError::credentials_required("positions").payload();
        assert_eq!(payload.error, "Credentials required for positions");
        assert!(payload.hint.is_some());
    }

    #[test]
    fn upstream_payload_keeps_body() {
        let payload = GatewayError::UpstreamError {
            status: 403,
            body: "insufficient buying power".into(),
        }
        .payload();
        assert!(payload.error.contains("insufficient buying power"));
        assert!(payload.hint.is_none());
    }

    #[test]
    fn unauthorized_maps_to_credentials_required() {
        let err = GatewayError::from_provider("account", ProviderError::Unauthorized);
        assert_eq!(err, GatewayError::credentials_required("account"));
    }

    #[test]
    fn only_transient_errors_degrade() {
        assert!(GatewayError::RateLimited.is_degradable());
        assert!(GatewayError::ConnectionError("x".into()).is_degradable());
        assert!(!GatewayError::credentials_required("x").is_degradable());
    }

    #[test_case(503, true ; "service unavailable")]
    #[test_case(500, true ; "internal error")]
    #[test_case(422, false ; "unprocessable")]
    #[test_case(404, false ; "not found")]
    fn upstream_degrades_only_on_server_errors(status: u16, expected: bool) {
        let err = GatewayError::UpstreamError {
            status,
            body: String::new(),
        };
        assert_eq!(err.is_degradable(), expected);
    }
}
