//! Host resource-loading capability.
//!
//! # Responsibilities
//! - Issue one load per attempt
//! - Report exactly one completion signal through the attempt handle
//!
//! # Design Decisions
//! - Loaders never enforce the timeout; the attempt's timer does
//! - In-flight work is dropped once the attempt completes by other means
//! - HTTP loading uses a single pooled `reqwest` client

use std::time::Duration;

use url::Url;

use crate::probe::attempt::AttemptHandle;
use crate::probe::signal::CompletionSignal;

/// A capability that can load a remote resource.
pub trait ResourceLoader: Send + Sync {
    /// Start loading `url`. The outcome must be delivered through
    /// `handle.signal(..)`; signals after the first are ignored.
    fn issue_load(&self, url: &Url, handle: AttemptHandle);
}

/// Error building a loader.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Loads resources over HTTP(S) with a `GET`.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
}

impl HttpLoader {
    pub fn new() -> Result<Self, LoaderError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("netprobe/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    /// Use a preconfigured client (proxies, TLS roots, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ResourceLoader for HttpLoader {
    fn issue_load(&self, url: &Url, handle: AttemptHandle) {
        let request = self.client.get(url.clone());
        let url = url.clone();

        tokio::spawn(async move {
            let signal = tokio::select! {
                signal = fetch(request, &url) => signal,
                _ = handle.finished() => {
                    tracing::trace!(attempt = %handle.id(), url = %url, "Dropping in-flight load");
                    return;
                }
            };
            handle.signal(signal);
        });
    }
}

async fn fetch(request: reqwest::RequestBuilder, url: &Url) -> CompletionSignal {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Probe load failed: connection error");
            return CompletionSignal::Error;
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::debug!(url = %url, status = %status, "Probe load failed: non-success status");
        return CompletionSignal::Error;
    }

    match response.bytes().await {
        Ok(_) => CompletionSignal::Loaded,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Probe load aborted while reading body");
            CompletionSignal::Abort
        }
    }
}
