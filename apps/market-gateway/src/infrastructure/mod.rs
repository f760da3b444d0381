//! Infrastructure Layer
//!
//! Adapters implementing the application ports and the HTTP surface.

/// Alpaca brokerage adapter (primary provider).
pub mod alpaca;

/// Credential resolution.
pub mod credentials;

/// axum REST surface.
pub mod http;

/// Yahoo Finance chart adapter (delayed fallback).
pub mod yahoo;
