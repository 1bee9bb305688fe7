//! Reachability state machine.
//!
//! # State Transitions
//! ```text
//! * → Offline: consecutive failures >= offline_threshold
//! * → Online:  consecutive successes >= online_threshold
//! ```
//!
//! # Design Decisions
//! - Hysteresis prevents flapping
//! - Counters of the opposite kind reset on every observation

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Reachability as seen by the monitor.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Unknown = 0,
    Online = 1,
    Offline = 2,
}

impl From<u8> for Reachability {
    fn from(val: u8) -> Self {
        match val {
            1 => Reachability::Online,
            2 => Reachability::Offline,
            _ => Reachability::Unknown,
        }
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reachability::Unknown => f.write_str("unknown"),
            Reachability::Online => f.write_str("online"),
            Reachability::Offline => f.write_str("offline"),
        }
    }
}

/// Thread-safe tracker of consecutive probe results.
#[derive(Debug)]
pub struct ReachabilityTracker {
    state: AtomicU8,
    consecutive_failures: AtomicUsize,
    consecutive_successes: AtomicUsize,
    online_threshold: usize,
    offline_threshold: usize,
}

impl ReachabilityTracker {
    pub fn new(online_threshold: usize, offline_threshold: usize) -> Self {
        Self {
            state: AtomicU8::new(Reachability::Unknown as u8),
            consecutive_failures: AtomicUsize::new(0),
            consecutive_successes: AtomicUsize::new(0),
            online_threshold: online_threshold.max(1),
            offline_threshold: offline_threshold.max(1),
        }
    }

    pub fn state(&self) -> Reachability {
        Reachability::from(self.state.load(Ordering::Relaxed))
    }

    /// Record a reachable result. Returns the new state on transition.
    pub fn mark_success(&self) -> Option<Reachability> {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        if self.state() == Reachability::Online {
            return None;
        }

        let successes = self.consecutive_successes.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= self.online_threshold {
            self.transition(Reachability::Online)
        } else {
            None
        }
    }

    /// Record an unreachable result. Returns the new state on transition.
    pub fn mark_failure(&self) -> Option<Reachability> {
        self.consecutive_successes.store(0, Ordering::Relaxed);
        if self.state() == Reachability::Offline {
            return None;
        }

        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.offline_threshold {
            self.transition(Reachability::Offline)
        } else {
            None
        }
    }

    fn transition(&self, to: Reachability) -> Option<Reachability> {
        let from = Reachability::from(self.state.swap(to as u8, Ordering::Relaxed));
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.consecutive_successes.store(0, Ordering::Relaxed);
        (from != to).then_some(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unknown() {
        let tracker = ReachabilityTracker::new(1, 2);
        assert_eq!(tracker.state(), Reachability::Unknown);
    }

    #[test]
    fn offline_requires_consecutive_failures() {
        let tracker = ReachabilityTracker::new(1, 3);
        assert_eq!(tracker.mark_failure(), None);
        assert_eq!(tracker.mark_failure(), None);
        assert_eq!(tracker.mark_failure(), Some(Reachability::Offline));
        assert_eq!(tracker.mark_failure(), None);
        assert_eq!(tracker.state(), Reachability::Offline);
    }

    #[test]
    fn success_resets_failure_streak() {
        let tracker = ReachabilityTracker::new(2, 2);
        tracker.mark_failure();
        tracker.mark_success();
        assert_eq!(tracker.mark_failure(), None);
        assert_eq!(tracker.state(), Reachability::Unknown);
    }

    #[test]
    fn recovers_after_online_threshold() {
        let tracker = ReachabilityTracker::new(2, 1);
        assert_eq!(tracker.mark_failure(), Some(Reachability::Offline));
        assert_eq!(tracker.mark_success(), None);
        assert_eq!(tracker.mark_success(), Some(Reachability::Online));
        assert_eq!(tracker.state(), Reachability::Online);
    }

    #[test]
    fn zero_thresholds_are_clamped() {
        let tracker = ReachabilityTracker::new(0, 0);
        assert_eq!(tracker.mark_success(), Some(Reachability::Online));
    }
}
