//! Retry-chain request.

use std::time::Duration;

use url::Url;

use crate::config::schema::{ProbeConfig, RetryConfig};

/// One link of a retry chain.
///
/// Immutable per attempt; a failed attempt hands its successor to the next
/// link via [`ProbeRequest::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub url: Url,
    pub timeout: Duration,
    pub retries_remaining: u32,
    pub pause_between_retries: Duration,
}

impl ProbeRequest {
    /// Request with a single attempt and no pause.
    pub fn new(url: Url, timeout: Duration) -> Self {
        Self {
            url,
            timeout,
            retries_remaining: 1,
            pause_between_retries: Duration::ZERO,
        }
    }

    /// Build a request from the probe and retry sections of the settings.
    pub fn from_config(url: Url, probe: &ProbeConfig, retry: &RetryConfig) -> Self {
        Self {
            url,
            timeout: probe.timeout(),
            retries_remaining: retry.retries,
            pause_between_retries: retry.pause(),
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries_remaining = retries;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause_between_retries = pause;
        self
    }

    /// True when no attempt is left.
    pub fn is_exhausted(&self) -> bool {
        self.retries_remaining == 0
    }

    /// Successor request after a failed attempt.
    pub fn next(&self) -> Self {
        Self {
            retries_remaining: self.retries_remaining.saturating_sub(1),
            ..self.clone()
        }
    }
}
