//! Network reachability prober.
//!
//! Loads a tiny remote resource with a bounded timeout and a bounded,
//! strictly sequential retry chain to tell "the server failed" apart from
//! "there is no network".

pub mod config;
pub mod lifecycle;
pub mod monitor;
pub mod observability;
pub mod probe;

pub use config::ProbeSettings;
pub use probe::{Prober, ProbeRequest};
