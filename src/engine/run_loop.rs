//! Background request loop.
//!
//! # Iteration
//! ```text
//! snapshot LoadConfig
//!     → build message → maybe corrupt
//!     → injected latency            (interruptible)
//!     → synthetic failure gate
//!     → gateway send                (bounded by send timeout, never aborted)
//!     → record outcome
//!     → rate delay                  (interruptible)
//! ```
//!
//! Stop is cooperative: the stop signal is checked between iterations and
//! races both sleeps, but a send that has started is allowed to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::engine::control::Shared;
use crate::engine::message::{MessageKind, SyntheticMessage};
use crate::engine::rate::inter_request_delay;
use crate::gateway::{dispatch, SendOutcome};
use crate::observability::metrics;

pub(crate) struct RunLoop {
    shared: Arc<Shared>,
    stop: watch::Receiver<bool>,
}

enum Step {
    Continue,
    Stop,
}

impl RunLoop {
    pub(crate) fn new(shared: Arc<Shared>, stop: watch::Receiver<bool>) -> Self {
        Self { shared, stop }
    }

    /// Run until stopped. Waits for `previous` first so two loops never
    /// overlap when a restart follows a stop that is still draining.
    pub(crate) async fn run(mut self, previous: Option<JoinHandle<()>>) {
        if let Some(previous) = previous {
            if let Err(e) = previous.await {
                tracing::warn!(error = %e, "Previous run loop ended abnormally");
            }
        }

        tracing::info!("Run loop started");

        while !self.stop_requested() {
            if let Step::Stop = self.iteration().await {
                break;
            }
        }

        tracing::info!("Run loop stopped");
    }

    fn stop_requested(&self) -> bool {
        *self.stop.borrow()
    }

    async fn iteration(&mut self) -> Step {
        let config = **self.shared.config.load();
        let faults = &self.shared.faults;

        let message = SyntheticMessage::generate(MessageKind::Loop);
        let message = faults.maybe_corrupt(message, config.corruption_pct);

        if config.latency_ms > 0 {
            tracing::info!(
                message_id = %message.id,
                latency_ms = config.latency_ms,
                "Injecting latency"
            );
            tokio::select! {
                _ = faults.inject_latency(config.latency_ms) => {}
                _ = self.stop.changed() => return Step::Stop,
            }
        }

        self.shared.stats.record_iteration(message.is_corrupted());
        if message.is_corrupted() {
            metrics::record_corrupted();
        }

        let (outcome, elapsed) = if faults.should_fail(config.failure_rate_pct) {
            tracing::error!(
                message_id = %message.id,
                generated_at = %message.generated_at,
                "Simulating a message send failure"
            );
            (SendOutcome::skipped(), Duration::ZERO)
        } else {
            if message.is_corrupted() {
                tracing::warn!(message_id = %message.id, "Sending corrupted message");
            } else {
                tracing::debug!(message_id = %message.id, "Sending message");
            }
            dispatch(self.shared.gateway.as_ref(), &message, self.shared.send_timeout).await
        };

        self.shared.stats.record_outcome(&outcome);
        match (outcome.attempted, &outcome.external_id) {
            (false, _) => metrics::record_synthetic_failure(),
            (true, Some(external_id)) => {
                metrics::record_sent(elapsed);
                tracing::info!(
                    message_id = %message.id,
                    external_id = %external_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Message sent"
                );
            }
            (true, None) => {
                metrics::record_send_error(elapsed);
                tracing::error!(
                    message_id = %message.id,
                    generated_at = %message.generated_at,
                    gateway = self.shared.gateway.name(),
                    error = outcome.error.as_deref().unwrap_or("unknown"),
                    "Failed to send message"
                );
            }
        }

        let delay = inter_request_delay(config.rate_per_minute);
        tokio::select! {
            _ = sleep(delay) => Step::Continue,
            _ = self.stop.changed() => Step::Stop,
        }
    }
}
