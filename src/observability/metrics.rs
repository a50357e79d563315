//! Metrics collection and exposition.
//!
//! # Metrics
//! - `loadgen_requests_total` (counter): loop requests by outcome
//! - `loadgen_corrupted_total` (counter): bodies deliberately broken
//! - `loadgen_invocations_total` (counter): invoke-once calls by outcome
//! - `loadgen_send_duration_seconds` (histogram): gateway send latency
//! - `loadgen_running` (gauge): 1 while the run loop is active
//! - `loadgen_rate_per_minute`, `loadgen_failure_rate_pct`,
//!   `loadgen_latency_ms`, `loadgen_corruption_pct` (gauges): live config
//!
//! Without an installed recorder every call here is a no-op, so the engine
//! records unconditionally.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::engine::LoadConfig;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_sent(duration: Duration) {
    counter!("loadgen_requests_total", "outcome" => "sent").increment(1);
    histogram!("loadgen_send_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_send_error(duration: Duration) {
    counter!("loadgen_requests_total", "outcome" => "send_error").increment(1);
    histogram!("loadgen_send_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_synthetic_failure() {
    counter!("loadgen_requests_total", "outcome" => "synthetic_failure").increment(1);
}

pub fn record_corrupted() {
    counter!("loadgen_corrupted_total").increment(1);
}

pub fn record_invocation(sent: bool) {
    let outcome = if sent { "sent" } else { "send_error" };
    counter!("loadgen_invocations_total", "outcome" => outcome).increment(1);
}

pub fn record_running(running: bool) {
    gauge!("loadgen_running").set(if running { 1.0 } else { 0.0 });
}

pub fn record_config(config: &LoadConfig) {
    gauge!("loadgen_rate_per_minute").set(f64::from(config.rate_per_minute));
    gauge!("loadgen_failure_rate_pct").set(f64::from(config.failure_rate_pct));
    gauge!("loadgen_latency_ms").set(config.latency_ms as f64);
    gauge!("loadgen_corruption_pct").set(f64::from(config.corruption_pct));
}
