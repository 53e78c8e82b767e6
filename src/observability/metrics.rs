//! Metrics collection and exposition.
//!
//! # Metrics
//! - `endpoint_watch_probes_total` (counter): probes by kind, status
//! - `endpoint_watch_probe_duration_seconds` (histogram): probe latency by kind
//! - `endpoint_watch_poll_ticks_total` (counter): scheduler ticks
//! - `endpoint_watch_polled_connections` (gauge): connections fanned out on the last tick
//! - `endpoint_watch_cached_results` (gauge): entries in the health cache
//! - `endpoint_watch_connections` (gauge): connections in the registry

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::health::HealthStatus;

/// Start the Prometheus scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(kind: &'static str, status: HealthStatus, started: Instant) {
    counter!("endpoint_watch_probes_total", "kind" => kind, "status" => status.as_str()).increment(1);
    histogram!("endpoint_watch_probe_duration_seconds", "kind" => kind).record(started.elapsed().as_secs_f64());
}

pub fn record_poll_tick(connections: usize) {
    counter!("endpoint_watch_poll_ticks_total").increment(1);
    gauge!("endpoint_watch_polled_connections").set(connections as f64);
}

pub fn record_cache_size(entries: usize) {
    gauge!("endpoint_watch_cached_results").set(entries as f64);
}

pub fn record_connection_count(connections: usize) {
    gauge!("endpoint_watch_connections").set(connections as f64);
}
