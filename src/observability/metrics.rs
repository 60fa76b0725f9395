//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by gateway outcome
//!   (forwarded, admin_forwarded, unauthorized, forbidden, error)
//!
//! # Design Decisions
//! - Prometheus exposition on a separate listener, off the request path
//! - Outcome labels are a small fixed set to keep cardinality bounded

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

/// Count one gateway evaluation by outcome.
pub fn record_outcome(outcome: &'static str) {
    metrics::counter!("gateway_requests_total", "outcome" => outcome).increment(1);
}
