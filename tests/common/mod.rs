//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Instant;
use url::Url;

use netprobe::probe::{AttemptHandle, CompletionSignal, DiagnosticSink, ProbeFailure, ResourceLoader};

/// What the scripted loader does for one attempt.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Deliver `signal` after `after`.
    Signal(CompletionSignal, Duration),
    /// Deliver `signal` before `issue_load` returns.
    Inline(CompletionSignal),
    /// Deliver `signal` from a plain OS thread after `after`.
    FromThread(CompletionSignal, Duration),
    /// Never deliver anything; only the timer can end the attempt.
    Hang,
}

/// In-memory loader that follows a script and records when each load was issued.
pub struct ScriptedLoader {
    steps: Mutex<VecDeque<Step>>,
    fallback: Step,
    issued: Mutex<Vec<Instant>>,
    urls: Mutex<Vec<Url>>,
}

impl ScriptedLoader {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Self::with_fallback(steps, Step::Hang)
    }

    pub fn with_fallback(steps: impl IntoIterator<Item = Step>, fallback: Step) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into_iter().collect()),
            fallback,
            issued: Mutex::new(Vec::new()),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn loads(&self) -> usize {
        self.issued.lock().unwrap().len()
    }

    pub fn issued_at(&self) -> Vec<Instant> {
        self.issued.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<Url> {
        self.urls.lock().unwrap().clone()
    }
}

impl ResourceLoader for ScriptedLoader {
    fn issue_load(&self, url: &Url, handle: AttemptHandle) {
        self.issued.lock().unwrap().push(Instant::now());
        self.urls.lock().unwrap().push(url.clone());
        let step = self.steps.lock().unwrap().pop_front().unwrap_or(self.fallback);

        match step {
            Step::Signal(signal, after) => {
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    handle.signal(signal);
                });
            }
            Step::Inline(signal) => {
                handle.signal(signal);
            }
            Step::FromThread(signal, after) => {
                std::thread::spawn(move || {
                    std::thread::sleep(after);
                    handle.signal(signal);
                });
            }
            Step::Hang => {}
        }
    }
}

/// Sink that keeps every failure kind and caught panic.
#[derive(Default)]
pub struct RecordingSink {
    pub failures: Mutex<Vec<ProbeFailure>>,
    pub exceptions: Mutex<Vec<String>>,
}

impl DiagnosticSink for RecordingSink {
    fn debug(&self, _message: &str) {}

    fn failure(&self, _url: &Url, failure: ProbeFailure) {
        self.failures.lock().unwrap().push(failure);
    }

    fn dump_exception(&self, message: &str) {
        self.exceptions.lock().unwrap().push(message.to_string());
    }
}

/// Sink whose `failure` panics; caught panics are kept.
#[derive(Default)]
pub struct PanickingSink {
    pub exceptions: Mutex<Vec<String>>,
}

impl DiagnosticSink for PanickingSink {
    fn debug(&self, _message: &str) {}

    fn failure(&self, _url: &Url, failure: ProbeFailure) {
        panic!("sink rejected {:?}", failure);
    }

    fn dump_exception(&self, message: &str) {
        self.exceptions.lock().unwrap().push(message.to_string());
    }
}

pub fn test_url() -> Url {
    Url::parse("https://probe.test/cleardot.gif").unwrap()
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Backend that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// Backend that promises a body and closes the connection half way.
pub async fn start_truncating_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial")
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
