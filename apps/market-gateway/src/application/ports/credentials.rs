//! Credential Resolver Port (Driven Port)
//!
//! Storage and decryption of credentials live outside the gateway; the
//! router only asks "what credentials does this caller have".

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Caller(Option<String>);

impl Caller {
    /// Identified caller. Blank identities are anonymous.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            Self(None)
        } else {
            Self(Some(trimmed.to_string()))
        }
    }

    /// Anonymous caller.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self(None)
    }

    /// Identity, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Suffix used to scope per-caller cache keys.
    #[must_use]
    pub fn scope(&self) -> String {
        self.0.as_ref().map_or_else(String::new, |id| format!("@{id}"))
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id().unwrap_or("anonymous"))
    }
}

/// Primary provider API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API key ID.
    pub api_key: String,
    /// API secret.
    pub api_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Create credentials.
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Either half is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.api_key.trim().is_empty() || self.api_secret.trim().is_empty()
    }

    /// Reject values that look like a bad paste: embedded whitespace,
    /// quotes, or non-printable characters.
    pub fn validate(&self) -> Result<(), GatewayError> {
        check_field("api_key", &self.api_key)?;
        check_field("api_secret", &self.api_secret)
    }
}

fn check_field(field: &'static str, value: &str) -> Result<(), GatewayError> {
    let malformed = value
        .chars()
        .any(|c| !c.is_ascii_graphic() || c == '"' || c == '\'' || c == '`');
    if malformed {
        return Err(GatewayError::MalformedCredentials { field });
    }
    Ok(())
}

/// Port for credential lookup.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Credentials for `caller`, or `None` when none are configured.
    async fn resolve(&self, caller: &Caller) -> Option<Credentials>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials::new("PKTEST", "very-secret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("PKTEST"));
        assert!(!debug.contains("very-secret"));
    }

    #[test_case("PK ABC" ; "embedded space")]
    #[test_case("\"PKABC\"" ; "quoted")]
    #[test_case("PKABC\n" ; "trailing newline")]
    #[test_case("PK\u{200b}ABC" ; "zero width space")]
    fn malformed_key(key: &str) {
        let err = Credentials::new(key, "secret").validate().unwrap_err();
        assert!(matches!(
            err,
            GatewayError::MalformedCredentials { field: "api_key" }
        ));
    }

    #[test]
    fn well_formed_credentials() {
        assert!(Credentials::new("PKABC123", "s3cr3t/+=").validate().is_ok());
    }

    #[test]
    fn blank_credentials() {
        assert!(Credentials::new("", "secret").is_blank());
        assert!(Credentials::new("key", "  ").is_blank());
        assert!(!Credentials::new("key", "secret").is_blank());
    }

    #[test]
    fn caller_scope() {
        assert_eq!(Caller::anonymous().scope(), "");
        assert_eq!(Caller::new("  ").scope(), "");
        assert_eq!(Caller::new("alice").scope(), "@alice");
    }
}
