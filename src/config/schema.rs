//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default probe timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProbeSettings {
    /// Probe target and per-attempt timeout.
    pub probe: ProbeConfig,

    /// Retry chain settings.
    pub retry: RetryConfig,

    /// Periodic monitoring.
    pub monitor: MonitorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    /// Resource to load instead of the default cache-busted image.
    pub url: Option<String>,

    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// Running on a plain `http` origin; the default URL then keeps `http`.
    pub insecure_origin: bool,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            insecure_origin: false,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Number of attempts in a chain (0 = report failure without probing).
    pub retries: u32,

    /// Pause after each failed attempt in milliseconds.
    pub pause_ms: u64,
}

impl RetryConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            pause_ms: 0,
        }
    }
}

/// Monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between probe chains.
    pub interval_secs: u64,

    /// Consecutive successful chains before reporting online.
    pub online_threshold: u32,

    /// Consecutive failed chains before reporting offline.
    pub offline_threshold: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            online_threshold: 1,
            offline_threshold: 2,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint while monitoring.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9091".to_string(),
        }
    }
}
