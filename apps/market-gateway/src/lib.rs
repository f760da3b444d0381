// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Market Gateway - Rust Core Library
//!
//! Request-serving pipeline that sits between the trading UI and two
//! upstream data providers: the credentialed Alpaca brokerage API and an
//! uncredentialed delayed-quote fallback.
//!
//! # Architecture (Clean Architecture + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Pure logic with no I/O
//!   - `instrument`: stock vs. crypto classification, pair normalization
//!   - `market`: canonical `Quote`, `Bar`, `Account`, `Position`, `Order` records
//!   - `options`: OCC identifiers, chain snapshots, nearest-contract resolution
//!
//! - **Application**: Orchestration
//!   - `ports`: `PrimaryProvider`, `FallbackQuoteProvider`, `CredentialResolver`
//!   - `services`: `CacheStore`, `RateThrottle`, `RequestRouter`
//!
//! - **Infrastructure**: Adapters
//!   - `alpaca`: brokerage client and response normalizer
//!   - `yahoo`: delayed-quote fallback client
//!   - `credentials`: credential resolution
//!   - `http`: axum REST surface

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - Core logic with no external dependencies.
pub mod domain;

/// Application layer - Ports and orchestration services.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Gateway error taxonomy.
pub mod error;

/// Logging and metrics.
pub mod observability;

// Domain re-exports
pub use domain::instrument::{AssetClass, classify, normalize};
pub use domain::market::{
    Account, Activity, Bar, BarsQuery, OptionsOrderRequest, Order, OrderRequest, OrderSide,
    OrderType, Position, Quote, TimeInForce, Timeframe,
};
pub use domain::options::{
    ApproxContract, ChainQuery, ChainSnapshot, ContractResolver, ContractSnapshot, OccSymbol,
    OptionType, Resolution, ResolvedContract,
};

// Application re-exports
pub use application::ports::{
    Caller, CredentialResolver, Credentials, FallbackQuoteProvider, PrimaryProvider, ProviderError,
};
pub use application::services::{
    CacheConfig, CacheStore, CancelledOrder, GatewayRequest, GatewayResponse, Provenance,
    QuoteMap, RateThrottle, RequestRouter, ResolveContractQuery, ResponseData, RouterConfig,
};

// Infrastructure re-exports
pub use infrastructure::alpaca::{AlpacaConfig, AlpacaEnvironment, AlpacaError, AlpacaProvider};
pub use infrastructure::credentials::StaticCredentialResolver;
pub use infrastructure::http::{AppState, CALLER_HEADER, create_router};
pub use infrastructure::yahoo::{YahooConfig, YahooQuoteClient};

pub use error::{ErrorPayload, GatewayError};
