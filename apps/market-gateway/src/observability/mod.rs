//! Observability: structured logging and Prometheus metrics.

mod metrics;
mod tracing;

pub use self::metrics::{
    MetricsError, init_metrics, record_cache_lookup, record_gateway_request,
    record_provider_request, record_throttle_wait,
};
pub use self::tracing::{TracingError, init_tracing};
