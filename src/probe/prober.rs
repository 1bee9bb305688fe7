//! The reachability prober.
//!
//! # Responsibilities
//! - Single attempt: one load, one timer, one boolean
//! - Retry chain: sequential attempts separated by a pause
//! - Default probe URL with cache busting
//!
//! # Design Decisions
//! - Callback contract, never an error: every entry point invokes its
//!   callback exactly once
//! - Retries are scheduled on timer tasks, so no stack is held between
//!   attempts and at most one attempt of a chain is in flight
//! - A missing loader means every probe fails immediately

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use url::Url;

use crate::config::schema::ProbeConfig;
use crate::observability::metrics;
use crate::probe::attempt::{panic_message, AttemptHandle, AttemptId};
use crate::probe::diagnostics::{DiagnosticSink, TracingSink};
use crate::probe::loader::{HttpLoader, LoaderError, ResourceLoader};
use crate::probe::request::ProbeRequest;
use crate::probe::signal::ProbeFailure;
use crate::probe::uri;

/// Probes network reachability by loading a small remote resource.
///
/// Cheap to clone; clones share the loader and sink. Attempts are timed on
/// the tokio runtime they start from; outside a runtime they fail at once.
#[derive(Clone)]
pub struct Prober {
    loader: Option<Arc<dyn ResourceLoader>>,
    sink: Arc<dyn DiagnosticSink>,
    config: ProbeConfig,
}

impl Prober {
    /// Prober backed by the HTTP loader.
    pub fn new(config: ProbeConfig) -> Result<Self, LoaderError> {
        Ok(Self::with_loader(config, Arc::new(HttpLoader::new()?)))
    }

    /// Prober backed by a custom loader.
    pub fn with_loader(config: ProbeConfig, loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            loader: Some(loader),
            sink: Arc::new(TracingSink),
            config,
        }
    }

    /// Prober for an environment with no resource-loading capability.
    pub fn without_loader(config: ProbeConfig) -> Self {
        Self {
            loader: None,
            sink: Arc::new(TracingSink),
            config,
        }
    }

    /// Replace the diagnostic sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// The URL `probe` uses when given no override.
    pub fn default_url(&self) -> Url {
        uri::default_probe_url(self.config.insecure_origin)
    }

    /// One attempt with the default timeout; no retries.
    ///
    /// Without an override, probes the default resource with a fresh
    /// uniqueness token.
    pub fn probe<F>(&self, callback: F, resource_url_override: Option<Url>)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let url = resource_url_override.unwrap_or_else(|| self.default_url());
        self.load_once(&url, self.config.timeout(), callback);
    }

    /// Up to `request.retries_remaining` sequential attempts.
    ///
    /// Zero retries reports `false` without any attempt. A failed attempt
    /// schedules the next link after the pause, including after the last
    /// attempt, whose successor then reports `false`.
    pub fn probe_with_retries<F>(&self, request: ProbeRequest, callback: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.diagnose(|sink| {
            sink.debug(&format!(
                "probe_with_retries: {} remaining, pause {}ms",
                request.retries_remaining,
                request.pause_between_retries.as_millis()
            ))
        });

        if request.is_exhausted() {
            metrics::record_chain(false);
            callback(false);
            return;
        }

        // The outcome may arrive on a loader's own thread; schedule the
        // next link on the runtime that started this one.
        let runtime = Handle::try_current().ok();
        let next = request.next();
        let prober = self.clone();
        self.load_once(&request.url, request.timeout, move |succeeded| {
            if succeeded {
                metrics::record_chain(true);
                callback(true);
                return;
            }
            match runtime {
                Some(runtime) => {
                    runtime.spawn(async move {
                        tokio::time::sleep(next.pause_between_retries).await;
                        prober.probe_with_retries(next, callback);
                    });
                }
                None => {
                    metrics::record_chain(false);
                    callback(false);
                }
            }
        });
    }

    /// Single attempt against `url`.
    ///
    /// Without a loader, or outside a tokio runtime (no timer), this calls
    /// `callback(false)` before returning.
    pub fn load_once<F>(&self, url: &Url, timeout: Duration, callback: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let id = AttemptId::new();
        self.diagnose(|sink| sink.debug(&format!("{}: loading {}", id, url)));

        let capability = match (&self.loader, Handle::try_current()) {
            (Some(loader), Ok(runtime)) => Some((loader, runtime)),
            (Some(_), Err(_)) => {
                tracing::warn!(url = %url, "No tokio runtime to time the attempt");
                None
            }
            (None, _) => None,
        };
        let Some((loader, runtime)) = capability else {
            self.diagnose(|sink| sink.failure(url, ProbeFailure::CapabilityUnavailable));
            metrics::record_attempt(ProbeFailure::CapabilityUnavailable.as_str());
            callback(false);
            return;
        };

        let handle = AttemptHandle::new(id, url.clone(), Box::new(callback), self.sink.clone());
        handle.arm_timeout(timeout, &runtime);
        loader.issue_load(url, handle);
    }

    /// Run a sink call; a panicking sink is logged and otherwise ignored.
    fn diagnose(&self, report: impl FnOnce(&dyn DiagnosticSink)) {
        let sink = self.sink.as_ref();
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| report(sink))) {
            tracing::error!(panic = %panic_message(payload.as_ref()), "Diagnostic sink panicked");
        }
    }

    /// Awaitable form of [`Prober::probe`].
    pub async fn check(&self, resource_url_override: Option<Url>) -> bool {
        let (tx, rx) = oneshot::channel();
        self.probe(
            move |succeeded| {
                let _ = tx.send(succeeded);
            },
            resource_url_override,
        );
        rx.await.unwrap_or(false)
    }

    /// Awaitable form of [`Prober::probe_with_retries`].
    pub async fn check_with_retries(&self, request: ProbeRequest) -> bool {
        let (tx, rx) = oneshot::channel();
        self.probe_with_retries(request, move |succeeded| {
            let _ = tx.send(succeeded);
        });
        rx.await.unwrap_or(false)
    }
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober")
            .field("has_loader", &self.loader.is_some())
            .field("config", &self.config)
            .finish()
    }
}
