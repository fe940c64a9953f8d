//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, cache traffic, upstream failures, breakers)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_cache_hits_total` / `gateway_cache_misses_total` (counter): by resource
//! - `gateway_cache_errors_total` (counter): swallowed store errors by resource, op
//! - `gateway_upstream_failures_total` (counter): by resource, cause
//! - `gateway_breaker_state` (gauge): 0=closed, 1=half_open, 2=open
//! - `gateway_breaker_rejections_total` (counter): fail-fast rejections
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup
//! - Labels stay low-cardinality (never the cache key or city name)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::resilience::CircuitState;

/// Install the global Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(route: &str, status: u16, start: Instant) {
    let labels = [
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(resource: &'static str, hit: bool) {
    if hit {
        metrics::counter!("gateway_cache_hits_total", "resource" => resource).increment(1);
    } else {
        metrics::counter!("gateway_cache_misses_total", "resource" => resource).increment(1);
    }
}

pub fn record_cache_error(resource: &'static str, op: &'static str) {
    metrics::counter!("gateway_cache_errors_total", "resource" => resource, "op" => op)
        .increment(1);
}

pub fn record_upstream_failure(resource: &'static str, cause: &'static str) {
    metrics::counter!(
        "gateway_upstream_failures_total",
        "resource" => resource,
        "cause" => cause
    )
    .increment(1);
}

pub fn record_breaker_state(name: &str, state: CircuitState) {
    let value = match state {
        CircuitState::Closed => 0.0,
        CircuitState::HalfOpen => 1.0,
        CircuitState::Open => 2.0,
    };
    metrics::gauge!("gateway_breaker_state", "breaker" => name.to_string()).set(value);
}

pub fn record_breaker_rejection(name: &str) {
    metrics::counter!("gateway_breaker_rejections_total", "breaker" => name.to_string())
        .increment(1);
}

pub fn record_cache_entries(backend: &'static str, entries: usize) {
    metrics::gauge!("gateway_cache_entries", "backend" => backend).set(entries as f64);
}
