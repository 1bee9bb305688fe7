//! Lifecycle management for long-running modes.
//!
//! # Data Flow
//! ```text
//! signals.rs:
//!     SIGTERM/SIGINT → wait_for_signal() returns
//!
//! shutdown.rs:
//!     trigger() → broadcast → monitor loop exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
