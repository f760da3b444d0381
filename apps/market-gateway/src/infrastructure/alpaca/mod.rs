//! Alpaca Markets Adapter
//!
//! Implementation of `PrimaryProvider` for the Alpaca trading and market
//! data APIs:
//! - Per-request credentials (each caller brings their own keys)
//! - GET retries with exponential backoff and jitter
//! - Snapshot, trade, quote and bar normalization into canonical records
//! - Order shaping for equities, crypto and options

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;
mod normalizer;

pub use adapter::AlpacaProvider;
pub use config::{AlpacaConfig, AlpacaEnvironment, RetryConfig};
pub use error::AlpacaError;
