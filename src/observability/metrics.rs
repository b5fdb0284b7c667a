//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_resolutions_total` (counter): resolutions by outcome
//! - `router_resolution_duration_seconds` (histogram): time spent resolving
//! - `router_config_reloads_total` (counter): reloads by result
//!
//! # Design Decisions
//! - Recorded by the HTTP front, never inside the resolver
//! - Exporter is optional; without it the macros are no-ops

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one resolution.
pub fn record_resolution(outcome: &'static str, start: Instant) {
    metrics::counter!("router_resolutions_total", "outcome" => outcome).increment(1);
    metrics::histogram!("router_resolution_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a configuration reload attempt.
pub fn record_reload(success: bool) {
    let result = if success { "applied" } else { "rejected" };
    metrics::counter!("router_config_reloads_total", "result" => result).increment(1);
}
