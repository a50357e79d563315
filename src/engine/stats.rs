//! Traffic counters since process start.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::gateway::SendOutcome;

#[derive(Debug, Default)]
pub struct LoadStats {
    iterations: AtomicU64,
    sent: AtomicU64,
    send_errors: AtomicU64,
    synthetic_failures: AtomicU64,
    corrupted: AtomicU64,
    invocations: AtomicU64,
}

/// Point-in-time copy of [`LoadStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub iterations: u64,
    pub sent: u64,
    pub send_errors: u64,
    pub synthetic_failures: u64,
    pub corrupted: u64,
    pub invocations: u64,
}

impl LoadStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_iteration(&self, corrupted: bool) {
        self.iterations.fetch_add(1, Ordering::Relaxed);
        if corrupted {
            self.corrupted.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Count one loop outcome. An unattempted send is a synthetic failure.
    pub fn record_outcome(&self, outcome: &SendOutcome) {
        if !outcome.attempted {
            self.synthetic_failures.fetch_add(1, Ordering::Relaxed);
        } else if outcome.succeeded {
            self.sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.send_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            iterations: self.iterations.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
            synthetic_failures: self.synthetic_failures.load(Ordering::Relaxed),
            corrupted: self.corrupted.load(Ordering::Relaxed),
            invocations: self.invocations.load(Ordering::Relaxed),
        }
    }
}
