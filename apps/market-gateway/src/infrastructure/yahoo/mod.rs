//! Yahoo Finance chart adapter.
//!
//! Implements `FallbackQuoteProvider` over the public chart endpoint. No
//! credentials, delayed data, read-only.

mod api_types;
mod client;

pub use client::{YahooConfig, YahooQuoteClient};
