//! Prometheus metrics exposition
//!
//! Counters for the login protocol:
//!
//! - `login_handshakes_started_total`: request tokens obtained
//! - `login_completed_total`: verifiers exchanged for access tokens
//! - `login_exchange_failures_total`: provider token endpoint failures
//! - `login_state_mismatch_total`: callbacks with no matching pending cookie
//! - `gatekeeper_denied_total`: protected requests turned away

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering
/// metrics on the /metrics endpoint.
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Record the start of a handshake (request token obtained, pending cookie set).
pub fn record_handshake_started() {
    metrics::counter!("login_handshakes_started_total").increment(1);
}

/// Record a completed login (authenticated cookie written).
pub fn record_login_completed() {
    metrics::counter!("login_completed_total").increment(1);
}

/// Record a provider token endpoint failure.
pub fn record_exchange_failure() {
    metrics::counter!("login_exchange_failures_total").increment(1);
}

/// Record a callback that didn't match the pending cookie.
pub fn record_state_mismatch() {
    metrics::counter!("login_state_mismatch_total").increment(1);
}

/// Record a gatekeeper denial.
pub fn record_guard_denied() {
    metrics::counter!("gatekeeper_denied_total").increment(1);
}
