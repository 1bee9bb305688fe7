//! Metrics collection and exposition.
//!
//! # Metrics
//! - `netprobe_attempts_total` (counter): single attempts by outcome
//! - `netprobe_chains_total` (counter): retry chains by final result
//! - `netprobe_reachable` (gauge): 1=online, 0=offline

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record the end of one attempt.
pub fn record_attempt(outcome: &'static str) {
    metrics::counter!("netprobe_attempts_total", "outcome" => outcome).increment(1);
}

/// Record the final result of a retry chain.
pub fn record_chain(succeeded: bool) {
    let result = if succeeded { "reachable" } else { "unreachable" };
    metrics::counter!("netprobe_chains_total", "result" => result).increment(1);
}

/// Record the monitor's current reachability.
pub fn record_reachability(online: bool) {
    metrics::gauge!("netprobe_reachable").set(if online { 1.0 } else { 0.0 });
}
