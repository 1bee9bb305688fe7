//! Per-attempt handle and its completion path.
//!
//! # Responsibilities
//! - Identify each attempt for log correlation
//! - Fan the four completion signals into one completion function
//! - Guarantee the outer callback runs at most once
//! - Arm the timeout timer and release it when the attempt ends
//!
//! # State Machine
//! ```text
//! PENDING → SUCCEEDED   (Loaded)
//! PENDING → FAILED      (Error | Abort | Timeout)
//! ```
//! The transition happens on the first signal; every later signal is a no-op.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use url::Url;

use crate::observability::metrics;
use crate::probe::diagnostics::DiagnosticSink;
use crate::probe::signal::CompletionSignal;

/// Outer callback receiving the boolean outcome.
pub type ProbeCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Relaxed ordering is enough here: ids only need to be unique.
static ATTEMPT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

impl AttemptId {
    /// Generate a new unique attempt ID.
    pub fn new() -> Self {
        Self(ATTEMPT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt-{}", self.0)
    }
}

struct AttemptInner {
    id: AttemptId,
    url: Url,
    completed: AtomicBool,
    callback: Mutex<Option<ProbeCallback>>,
    done_tx: watch::Sender<bool>,
    sink: Arc<dyn DiagnosticSink>,
}

/// Handle to one in-flight attempt.
///
/// Cloned into the resource loader and the timeout timer. Whichever delivers
/// a signal first decides the outcome.
#[derive(Clone)]
pub struct AttemptHandle {
    inner: Arc<AttemptInner>,
}

impl AttemptHandle {
    pub(crate) fn new(
        id: AttemptId,
        url: Url,
        callback: ProbeCallback,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let (done_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(AttemptInner {
                id,
                url,
                completed: AtomicBool::new(false),
                callback: Mutex::new(Some(callback)),
                done_tx,
                sink,
            }),
        }
    }

    pub fn id(&self) -> AttemptId {
        self.inner.id
    }

    /// URL being loaded.
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// True once any signal has been delivered.
    pub fn is_completed(&self) -> bool {
        self.inner.completed.load(Ordering::Acquire)
    }

    /// Resolves once the attempt has completed. Loaders select on this to
    /// drop in-flight work after a timeout.
    pub async fn finished(&self) {
        let mut rx = self.inner.done_tx.subscribe();
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Deliver a completion signal.
    ///
    /// Returns `true` if this signal completed the attempt, `false` if the
    /// attempt had already completed and the signal was ignored.
    pub fn signal(&self, signal: CompletionSignal) -> bool {
        let inner = &self.inner;
        if inner
            .completed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!(attempt = %inner.id, signal = %signal, "Ignoring late completion signal");
            return false;
        }

        // Detach the callback before anything else can observe the handle.
        let callback = inner
            .callback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        inner.done_tx.send_replace(true);

        // Diagnostics must never stop the callback from running.
        let diagnostics = panic::catch_unwind(AssertUnwindSafe(|| {
            inner
                .sink
                .debug(&format!("{}: {} {}", inner.id, signal, inner.url));
            if let Some(failure) = signal.failure() {
                inner.sink.failure(&inner.url, failure);
            }
            metrics::record_attempt(signal.as_str());
        }));
        if let Err(payload) = diagnostics {
            self.report_panic(payload.as_ref());
        }

        if let Some(callback) = callback {
            let succeeded = signal.succeeded();
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || callback(succeeded))) {
                self.report_panic(payload.as_ref());
            }
        }
        true
    }

    fn report_panic(&self, payload: &(dyn Any + Send)) {
        let message = panic_message(payload);
        let sink = &self.inner.sink;
        if panic::catch_unwind(AssertUnwindSafe(|| sink.dump_exception(&message))).is_err() {
            tracing::error!(attempt = %self.inner.id, panic = %message, "Diagnostic sink panicked while reporting a panic");
        }
    }

    /// Spawn the timer that forces a `Timeout` signal after `timeout`.
    ///
    /// The timer exits early once the attempt completes.
    pub(crate) fn arm_timeout(&self, timeout: Duration, runtime: &Handle) {
        let handle = self.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => {
                    handle.signal(CompletionSignal::Timeout);
                }
                _ = handle.finished() => {}
            }
        });
    }
}

impl fmt::Debug for AttemptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttemptHandle")
            .field("id", &self.inner.id)
            .field("url", &self.inner.url.as_str())
            .field("completed", &self.is_completed())
            .finish()
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
