//! Active reachability monitoring.
//!
//! # Responsibilities
//! - Periodically run a retry chain against the probe target
//! - Update reachability state based on results

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};
use url::Url;

use crate::config::{MonitorConfig, RetryConfig};
use crate::monitor::state::{Reachability, ReachabilityTracker};
use crate::observability::metrics;
use crate::probe::{Prober, ProbeRequest};

pub struct ReachabilityMonitor {
    prober: Prober,
    target: Option<Url>,
    retry: RetryConfig,
    config: MonitorConfig,
    tracker: Arc<ReachabilityTracker>,
}

impl ReachabilityMonitor {
    /// `target` of `None` probes the default resource with a fresh token
    /// on every tick.
    pub fn new(prober: Prober, target: Option<Url>, retry: RetryConfig, config: MonitorConfig) -> Self {
        let tracker = Arc::new(ReachabilityTracker::new(
            config.online_threshold as usize,
            config.offline_threshold as usize,
        ));
        Self {
            prober,
            target,
            retry,
            config,
            tracker,
        }
    }

    /// Shared view of the current state.
    pub fn tracker(&self) -> Arc<ReachabilityTracker> {
        self.tracker.clone()
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = self.config.interval_secs,
            retries = self.retry.retries,
            "Reachability monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        // A chain can outlast the interval; never fire catch-up ticks back to back.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Reachability monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one retry chain and fold its result into the state.
    pub async fn check_once(&self) -> Reachability {
        let url = self
            .target
            .clone()
            .unwrap_or_else(|| self.prober.default_url());
        let request = ProbeRequest::from_config(url.clone(), self.prober.config(), &self.retry);

        let reachable = self.prober.check_with_retries(request).await;
        let transition = if reachable {
            self.tracker.mark_success()
        } else {
            tracing::warn!(url = %url, "Reachability check failed");
            self.tracker.mark_failure()
        };

        let state = self.tracker.state();
        if let Some(to) = transition {
            tracing::info!(state = %to, url = %url, "Reachability changed");
        }
        if state != Reachability::Unknown {
            metrics::record_reachability(state == Reachability::Online);
        }
        state
    }
}
