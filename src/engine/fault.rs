//! Fault injection.
//!
//! # Responsibilities
//! - Decide whether a request is dropped as a synthetic failure
//! - Hold a request back by the configured latency
//! - Corrupt a request body
//!
//! Each decision is an independent draw, so a single request can be delayed,
//! corrupted and failed at the same time. The RNG is seedable for
//! reproducible runs and deterministic tests.

use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::message::SyntheticMessage;

pub struct FaultInjector {
    rng: Mutex<StdRng>,
}

impl FaultInjector {
    /// Seed from `seed`, or from OS entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Uniform draw in 1..=100 against `pct`.
    fn roll(&self, pct: u32) -> bool {
        match pct {
            0 => false,
            p if p >= 100 => true,
            p => self.rng.lock().gen_range(1..=100) <= p,
        }
    }

    /// True when the request should be dropped instead of sent.
    pub fn should_fail(&self, failure_rate_pct: u32) -> bool {
        self.roll(failure_rate_pct)
    }

    /// Return the message unchanged or its corrupted variant.
    pub fn maybe_corrupt(&self, message: SyntheticMessage, corruption_pct: u32) -> SyntheticMessage {
        if self.roll(corruption_pct) {
            message.into_corrupted()
        } else {
            message
        }
    }

    /// Suspend the current request for `latency_ms`.
    pub async fn inject_latency(&self, latency_ms: u64) {
        if latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(latency_ms)).await;
        }
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::from_entropy()
    }
}
