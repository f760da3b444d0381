//! Application Ports (Driven)
//!
//! Interfaces the router uses to reach external systems:
//! - **PrimaryProvider**: credentialed brokerage (market data and trading)
//! - **FallbackQuoteProvider**: uncredentialed delayed quotes
//! - **CredentialResolver**: caller identity to provider credentials

mod credentials;
mod fallback_provider;
mod primary_provider;

pub use credentials::{Caller, CredentialResolver, Credentials};
pub use fallback_provider::FallbackQuoteProvider;
pub use primary_provider::{PrimaryProvider, ProviderError};
