//! Server-versus-network failure attribution.
//!
//! When an upstream request fails, a successful probe means the network
//! path is fine and the server is to blame.

use std::fmt;

use url::Url;

use crate::probe::prober::Prober;

/// Where an observed request failure most likely originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    /// Network is reachable; the server failed.
    Server,
    /// The probe failed too; no usable network path.
    Network,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Server => f.write_str("server"),
            FailureCause::Network => f.write_str("network"),
        }
    }
}

/// Probe once and attribute a failure accordingly.
pub async fn classify_failure(prober: &Prober, resource_url_override: Option<Url>) -> FailureCause {
    let cause = if prober.check(resource_url_override).await {
        FailureCause::Server
    } else {
        FailureCause::Network
    };
    tracing::info!(cause = %cause, "Classified request failure");
    cause
}
