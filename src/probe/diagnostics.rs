//! Diagnostic sink for probe activity.
//!
//! # Responsibilities
//! - Receive human-readable debug lines for each attempt
//! - Receive the failure kind behind every `false` outcome
//! - Receive panics caught inside the completion path
//!
//! # Design Decisions
//! - Observability only: nothing a sink does changes the outcome
//! - Default sink forwards to `tracing`

use url::Url;

use crate::probe::signal::ProbeFailure;

/// Receiver of probe diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// A debug line describing progress.
    fn debug(&self, message: &str);

    /// An attempt against `url` ended in `failure`.
    fn failure(&self, url: &Url, failure: ProbeFailure);

    /// A panic was caught while delivering an outcome.
    fn dump_exception(&self, message: &str);
}

/// Sink that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
    }

    fn failure(&self, url: &Url, failure: ProbeFailure) {
        tracing::debug!(url = %url, kind = failure.as_str(), "Probe attempt failed: {}", failure);
    }

    fn dump_exception(&self, message: &str) {
        tracing::error!(panic = %message, "Probe callback panicked");
    }
}
