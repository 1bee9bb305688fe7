//! Periodic reachability monitoring.
//!
//! # Data Flow
//! ```text
//! active.rs:
//!     Periodic timer
//!     → Retry chain through the prober
//!     → Update state.rs
//!
//! state.rs:
//!     Unknown → Online ←→ Offline
//!     With thresholds to prevent flapping
//! ```

pub mod active;
pub mod state;

pub use active::ReachabilityMonitor;
pub use state::{Reachability, ReachabilityTracker};
