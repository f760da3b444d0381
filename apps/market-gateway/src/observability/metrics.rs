//! Prometheus metrics for the gateway.
//!
//! Recording functions are no-ops until [`init_metrics`] installs a
//! recorder, so library code and tests can call them unconditionally.

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Throttle wait buckets from zero to ten seconds.
const WAIT_BUCKETS: &[f64] = &[0.0, 0.1, 0.5, 1.0, 2.0, 3.0, 5.0, 10.0];

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

/// Install the Prometheus exporter with an HTTP listener serving `/metrics`.
pub fn init_metrics(listen_addr: SocketAddr) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(listen_addr)
        .set_buckets(WAIT_BUCKETS)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(addr = %listen_addr, "Prometheus metrics exporter started");
    Ok(())
}

/// Record a cache lookup.
///
/// * `outcome` - `hit`, `miss` or `stale`
pub fn record_cache_lookup(outcome: &'static str) {
    counter!("gateway_cache_lookups_total", "outcome" => outcome).increment(1);
}

/// Record time spent waiting for a throttle slot.
pub fn record_throttle_wait(seconds: f64) {
    histogram!("gateway_throttle_wait_seconds").record(seconds);
}

/// Record an outbound provider call.
///
/// * `provider` - `primary` or `fallback`
/// * `outcome` - `ok` or the provider error kind
pub fn record_provider_request(provider: &'static str, outcome: &'static str) {
    counter!(
        "gateway_provider_requests_total",
        "provider" => provider,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a handled gateway request.
///
/// * `operation` - operation name
/// * `provenance` - response provenance, or `error`
pub fn record_gateway_request(operation: &'static str, provenance: &'static str) {
    counter!(
        "gateway_requests_total",
        "operation" => operation,
        "provenance" => provenance
    )
    .increment(1);
}
