//! Completion-path robustness: panicking sinks and signals from foreign threads.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use netprobe::config::ProbeConfig;
use netprobe::probe::{CompletionSignal, ProbeRequest, Prober};

mod common;
use common::{PanickingSink, RecordingSink, ScriptedLoader, Step};

fn outcome_channel() -> (impl FnOnce(bool) + Send + 'static, mpsc::UnboundedReceiver<bool>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        move |ok| {
            let _ = tx.send(ok);
        },
        rx,
    )
}

#[tokio::test]
async fn panicking_sink_never_reaches_the_caller() {
    let loader = ScriptedLoader::new([Step::Inline(CompletionSignal::Error)]);
    let sink = Arc::new(PanickingSink::default());
    let prober = Prober::with_loader(ProbeConfig::default(), loader).with_sink(sink.clone());
    let (callback, mut rx) = outcome_channel();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        prober.probe(callback, Some(common::test_url()));
    }));

    assert!(outcome.is_ok(), "sink panic escaped to the caller");
    assert_eq!(rx.try_recv(), Ok(false), "callback not delivered");

    let exceptions = sink.exceptions.lock().unwrap();
    assert_eq!(exceptions.len(), 1);
    assert!(exceptions[0].contains("sink rejected"));
}

#[tokio::test]
async fn panicking_sink_does_not_stop_the_chain() {
    let loader = ScriptedLoader::with_fallback(Vec::<Step>::new(), Step::Inline(CompletionSignal::Error));
    let sink = Arc::new(PanickingSink::default());
    let prober = Prober::with_loader(ProbeConfig::default(), loader.clone()).with_sink(sink.clone());

    let request = ProbeRequest::new(common::test_url(), Duration::from_secs(1)).with_retries(3);
    assert!(!prober.check_with_retries(request).await);

    assert_eq!(loader.loads(), 3);
    assert_eq!(sink.exceptions.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn foreign_thread_failures_run_every_attempt() {
    let loader = ScriptedLoader::with_fallback(
        Vec::<Step>::new(),
        Step::FromThread(CompletionSignal::Error, Duration::from_millis(10)),
    );
    let sink = Arc::new(RecordingSink::default());
    let prober = Prober::with_loader(ProbeConfig::default(), loader.clone()).with_sink(sink.clone());
    let (callback, mut rx) = outcome_channel();

    let request = ProbeRequest::new(common::test_url(), Duration::from_secs(5))
        .with_retries(3)
        .with_pause(Duration::from_millis(20));
    prober.probe_with_retries(request, callback);

    assert_eq!(rx.recv().await, Some(false));
    assert_eq!(loader.loads(), 3);
    assert!(sink.exceptions.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err(), "callback fired more than once");
}

#[tokio::test]
async fn foreign_thread_success_ends_the_chain() {
    let loader = ScriptedLoader::new([
        Step::FromThread(CompletionSignal::Error, Duration::from_millis(5)),
        Step::FromThread(CompletionSignal::Loaded, Duration::from_millis(5)),
    ]);
    let prober = Prober::with_loader(ProbeConfig::default(), loader.clone());

    let request = ProbeRequest::new(common::test_url(), Duration::from_secs(5)).with_retries(5);
    assert!(prober.check_with_retries(request).await);
    assert_eq!(loader.loads(), 2);
}
