//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Probe attempts, retry chains, monitor transitions produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and gauges via `metrics`)
//!
//! Consumers:
//!     → stderr (pretty or JSON)
//!     → Prometheus scrape endpoint (monitor mode only)
//! ```
//!
//! # Design Decisions
//! - Metric updates are no-ops until a recorder is installed
//! - Logs go to stderr so stdout stays machine-readable

pub mod logging;
pub mod metrics;
