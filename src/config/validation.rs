//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, thresholds > 0)
//! - Check that URLs and addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: ProbeSettings → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ProbeSettings;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("probe.timeout_ms must be greater than 0")]
    ZeroTimeout,
    #[error("probe.url '{url}' is invalid: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("monitor.interval_secs must be greater than 0")]
    ZeroInterval,
    #[error("monitor.{0} must be greater than 0")]
    ZeroThreshold(&'static str),
    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
    #[error("retry.retries must be greater than 0 when monitoring")]
    MonitorWithoutAttempts,
}

/// Validate the whole configuration.
pub fn validate_config(config: &ProbeSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.probe.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if let Some(raw) = &config.probe.url {
        if let Err(reason) = check_probe_url(raw) {
            errors.push(ValidationError::InvalidUrl {
                url: raw.clone(),
                reason,
            });
        }
    }

    if config.monitor.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.monitor.online_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold("online_threshold"));
    }
    if config.monitor.offline_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold("offline_threshold"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the configuration for `monitor` mode.
///
/// Zero retries is a legal one-off request but would leave the monitor
/// reporting offline without ever loading anything.
pub fn validate_monitor_config(config: &ProbeSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = match validate_config(config) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };
    if config.retry.retries == 0 {
        errors.push(ValidationError::MonitorWithoutAttempts);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_probe_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}
