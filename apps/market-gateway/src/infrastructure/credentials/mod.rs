//! In-memory credential resolver.
//!
//! Holds per-caller credentials plus an optional process-wide default
//! (typically the keys from configuration). Identified callers without
//! their own entry use the default.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::ports::{Caller, CredentialResolver, Credentials};

/// Credential resolver backed by a map.
#[derive(Debug, Default)]
pub struct StaticCredentialResolver {
    default: Option<Credentials>,
    per_caller: RwLock<HashMap<String, Credentials>>,
}

impl StaticCredentialResolver {
    /// Create a resolver with an optional default. Blank defaults are
    /// treated as absent.
    #[must_use]
    pub fn new(default: Option<Credentials>) -> Self {
        Self {
            default: default.filter(|c| !c.is_blank()),
            per_caller: RwLock::new(HashMap::new()),
        }
    }

    /// Register credentials for a caller, replacing any previous entry.
    pub fn insert(&self, caller_id: impl Into<String>, credentials: Credentials) {
        self.per_caller.write().insert(caller_id.into(), credentials);
    }

    /// Forget a caller's credentials.
    pub fn remove(&self, caller_id: &str) -> Option<Credentials> {
        self.per_caller.write().remove(caller_id)
    }

    /// Whether a process-wide default is configured.
    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

#[async_trait]
impl CredentialResolver for StaticCredentialResolver {
    async fn resolve(&self, caller: &Caller) -> Option<Credentials> {
        caller
            .id()
            .and_then(|id| self.per_caller.read().get(id).cloned())
            .or_else(|| self.default.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn anonymous_uses_default() {
        let resolver = StaticCredentialResolver::new(Some(Credentials::new("PKDEF", "s")));

        let creds = resolver.resolve(&Caller::anonymous()).await.unwrap();

        assert_eq!(creds.api_key, "PKDEF");
    }

    #[tokio::test]
    async fn per_caller_entry_wins() {
        let resolver = StaticCredentialResolver::new(Some(Credentials::new("PKDEF", "s")));
        resolver.insert("alice", Credentials::new("PKALICE", "s"));

        let alice = resolver.resolve(&Caller::new("alice")).await.unwrap();
        let bob = resolver.resolve(&Caller::new("bob")).await.unwrap();

        assert_eq!(alice.api_key, "PKALICE");
        assert_eq!(bob.api_key, "PKDEF");
    }

    #[tokio::test]
    async fn blank_default_is_absent() {
        let resolver = StaticCredentialResolver::new(Some(Credentials::new("", "")));

        assert!(!resolver.has_default());
        assert!(resolver.resolve(&Caller::anonymous()).await.is_none());
    }

    #[tokio::test]
    async fn removed_caller_falls_back() {
        let resolver = StaticCredentialResolver::new(None);
        resolver.insert("alice", Credentials::new("PKALICE", "s"));
        resolver.remove("alice");

        assert!(resolver.resolve(&Caller::new("alice")).await.is_none());
    }
}
