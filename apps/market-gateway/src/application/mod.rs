//! Application Layer
//!
//! Orchestrates the domain through the request pipeline:
//!
//! - **Ports**: Interfaces to the primary provider, the delayed-quote
//!   fallback and the credential store
//! - **Services**: Cache store, rate throttle and the request router

pub mod ports;
pub mod services;
