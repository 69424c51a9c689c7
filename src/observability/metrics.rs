//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guard_rate_limited_total` (counter): throttle rejections by preset
//! - `guard_login_failures_total` (counter): failed sign-ins
//! - `guard_lockouts_total` (counter): lockouts started
//! - `guard_swept_records_total` (counter): records removed by sweeps, by store
//! - `guard_consents_total` (counter): consent events by action
//! - `guard_dsar_submitted_total` (counter): DSAR submissions by type

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_rate_limited(preset: &'static str) {
    counter!("guard_rate_limited_total", "preset" => preset).increment(1);
}

pub fn record_login_failure() {
    counter!("guard_login_failures_total").increment(1);
}

pub fn record_lockout() {
    counter!("guard_lockouts_total").increment(1);
}

pub fn record_sweep(store: &'static str, removed: usize) {
    counter!("guard_swept_records_total", "store" => store).increment(removed as u64);
}

pub fn record_consent(action: &'static str) {
    counter!("guard_consents_total", "action" => action).increment(1);
}

pub fn record_dsar_submitted(request_type: &'static str) {
    counter!("guard_dsar_submitted_total", "type" => request_type).increment(1);
}
