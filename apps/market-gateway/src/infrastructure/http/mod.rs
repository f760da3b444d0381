//! HTTP/REST API adapter.
//!
//! Inbound adapter exposing one route per gateway operation plus a single
//! tagged-envelope endpoint. Every route delegates to the request router.

mod controller;
mod request;
mod response;

pub use controller::{AppState, CALLER_HEADER, create_router};
pub use request::QuotesParams;
pub use response::HealthResponse;
