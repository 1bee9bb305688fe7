//! Completion signals and the failure taxonomy.
//!
//! A resource load ends in exactly one of four signals. Callers only ever
//! see a boolean; the failure kind is reported to the diagnostic sink.

use std::fmt;

/// One of the four mutually exclusive ways an attempt can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionSignal {
    /// The resource loaded.
    Loaded,
    /// The load failed (transport error or non-success status).
    Error,
    /// The load started but was cut off before the resource arrived.
    Abort,
    /// The attempt's timer expired first.
    Timeout,
}

impl CompletionSignal {
    /// Boolean outcome delivered to the caller.
    pub fn succeeded(self) -> bool {
        matches!(self, CompletionSignal::Loaded)
    }

    /// Failure kind for the diagnostic sink, `None` on success.
    pub fn failure(self) -> Option<ProbeFailure> {
        match self {
            CompletionSignal::Loaded => None,
            CompletionSignal::Error => Some(ProbeFailure::LoadError),
            CompletionSignal::Abort => Some(ProbeFailure::LoadAbort),
            CompletionSignal::Timeout => Some(ProbeFailure::LoadTimeout),
        }
    }

    /// Metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            CompletionSignal::Loaded => "loaded",
            CompletionSignal::Error => "error",
            CompletionSignal::Abort => "abort",
            CompletionSignal::Timeout => "timeout",
        }
    }
}

impl fmt::Display for CompletionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an attempt reported `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ProbeFailure {
    #[error("resource load error")]
    LoadError,
    #[error("resource load aborted")]
    LoadAbort,
    #[error("resource load timed out")]
    LoadTimeout,
    #[error("resource loading is not available")]
    CapabilityUnavailable,
}

impl ProbeFailure {
    /// Metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeFailure::LoadError => "error",
            ProbeFailure::LoadAbort => "abort",
            ProbeFailure::LoadTimeout => "timeout",
            ProbeFailure::CapabilityUnavailable => "unavailable",
        }
    }
}
