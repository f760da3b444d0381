//! Application Services
//!
//! The request pipeline: cache lookup, throttle, provider dispatch,
//! degradation.

pub(crate) mod cache_key;
mod cache_store;
mod rate_throttle;
mod request;
mod request_router;

pub use cache_store::{CacheConfig, CacheStore};
pub use rate_throttle::RateThrottle;
pub use request::{
    CancelledOrder, GatewayRequest, GatewayResponse, Provenance, ResolveContractQuery,
    ResponseData,
};
pub use request_router::{QuoteMap, RequestRouter, RouterConfig};
