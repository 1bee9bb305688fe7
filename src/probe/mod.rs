//! Network reachability probing.
//!
//! # Data Flow
//! ```text
//! probe() / probe_with_retries()
//!     → prober.rs (build URL, count retries)
//!     → attempt.rs (handle + timeout timer)
//!     → loader.rs (issue the load)
//!     → one CompletionSignal {Loaded, Error, Abort, Timeout}
//!     → attempt.rs completion path (first signal wins)
//!     → callback(bool), failure kind → diagnostics.rs
//! ```
//!
//! # Design Decisions
//! - Error, abort and timeout collapse to `false` for callers
//! - The failure taxonomy stays visible to the diagnostic sink
//! - Timeout and retry pause are configuration, not process-wide state

pub mod attempt;
pub mod classify;
pub mod diagnostics;
pub mod loader;
pub mod prober;
pub mod request;
pub mod signal;
pub mod uri;

pub use attempt::{AttemptHandle, AttemptId, ProbeCallback};
pub use classify::{classify_failure, FailureCause};
pub use diagnostics::{DiagnosticSink, TracingSink};
pub use loader::{HttpLoader, LoaderError, ResourceLoader};
pub use prober::Prober;
pub use request::ProbeRequest;
pub use signal::{CompletionSignal, ProbeFailure};
