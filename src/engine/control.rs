//! Control surface.
//!
//! # Responsibilities
//! - Own the live [`LoadConfig`] and the Running/Stopped state
//! - Start and stop the run loop (idempotently)
//! - Apply partial config updates atomically
//! - Send one-off messages independent of the loop
//!
//! # Design Decisions
//! - Config lives in an `ArcSwap`: readers never block, writers replace it whole
//! - Status is an atomic flag flipped synchronously by start/stop
//! - Task handles sit behind a mutex that is only held for bookkeeping, never across an await

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::engine::error::ControlError;
use crate::engine::fault::FaultInjector;
use crate::engine::message::{MessageKind, SyntheticMessage};
use crate::engine::run_loop::RunLoop;
use crate::engine::settings::{Adjustment, ConfigUpdate, LoadConfig, ValidationPolicy};
use crate::engine::stats::{LoadStats, StatsSnapshot};
use crate::gateway::{dispatch, SendGateway};
use crate::observability::metrics;

/// Run state of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    Running,
    Stopped,
}

/// Snapshot returned by [`ControlSurface::status`].
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub status: RunStatus,
    #[serde(flatten)]
    pub config: LoadConfig,
    pub stats: StatsSnapshot,
}

/// Result of an applied config update.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigChange {
    pub config: LoadConfig,
    pub adjusted: Vec<Adjustment>,
}

/// Result of a one-off send.
#[derive(Debug, Clone, Serialize)]
pub struct InvokeOutcome {
    pub message_id: Uuid,
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Engine settings that are fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub initial: LoadConfig,
    pub send_timeout: Duration,
    pub policy: ValidationPolicy,
    pub seed: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            initial: LoadConfig::default(),
            send_timeout: Duration::from_secs(5),
            policy: ValidationPolicy::Clamp,
            seed: None,
        }
    }
}

impl EngineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        let (initial, adjustments) = LoadConfig::from_defaults(&config.load);
        for adj in &adjustments {
            tracing::warn!(
                field = adj.field,
                requested = adj.requested,
                applied = adj.applied,
                "Clamped out-of-range load default"
            );
        }
        Self {
            initial,
            send_timeout: Duration::from_millis(config.queue.send_timeout_ms),
            policy: ValidationPolicy::from_strict(config.control.strict_validation),
            seed: config.load.seed,
        }
    }
}

/// State shared between the control surface and the run loop task.
pub(crate) struct Shared {
    pub(crate) config: ArcSwap<LoadConfig>,
    pub(crate) gateway: Arc<dyn SendGateway>,
    pub(crate) faults: FaultInjector,
    pub(crate) stats: LoadStats,
    pub(crate) send_timeout: Duration,
}

struct ActiveRun {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Runner {
    active: Option<ActiveRun>,
    /// A stopped loop that may still be finishing its in-flight request.
    draining: Option<JoinHandle<()>>,
}

pub struct ControlSurface {
    shared: Arc<Shared>,
    running: AtomicBool,
    runner: Mutex<Runner>,
    policy: ValidationPolicy,
}

impl ControlSurface {
    pub fn new(gateway: Arc<dyn SendGateway>, options: EngineOptions) -> Self {
        let faults = FaultInjector::new(options.seed);
        Self::with_faults(gateway, options, faults)
    }

    /// Build with an explicit fault injector.
    pub fn with_faults(
        gateway: Arc<dyn SendGateway>,
        options: EngineOptions,
        faults: FaultInjector,
    ) -> Self {
        metrics::record_config(&options.initial);
        metrics::record_running(false);

        Self {
            shared: Arc::new(Shared {
                config: ArcSwap::from_pointee(options.initial),
                gateway,
                faults,
                stats: LoadStats::new(),
                send_timeout: options.send_timeout,
            }),
            running: AtomicBool::new(false),
            runner: Mutex::new(Runner::default()),
            policy: options.policy,
        }
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.run_status(),
            config: self.config(),
            stats: self.shared.stats.snapshot(),
        }
    }

    pub fn run_status(&self) -> RunStatus {
        if self.running.load(Ordering::SeqCst) {
            RunStatus::Running
        } else {
            RunStatus::Stopped
        }
    }

    pub fn config(&self) -> LoadConfig {
        **self.shared.config.load()
    }

    /// Validate and apply a partial update. Omitted fields keep their value.
    pub fn update_config(&self, update: &ConfigUpdate) -> Result<ConfigChange, ControlError> {
        let validated = update.validate(self.policy)?;
        for adj in &validated.adjustments {
            tracing::warn!(
                field = adj.field,
                requested = adj.requested,
                applied = adj.applied,
                "Clamped out-of-range config value"
            );
        }

        let previous = self
            .shared
            .config
            .rcu(|current| Arc::new(current.merged(&validated)));
        let config = previous.merged(&validated);

        metrics::record_config(&config);
        tracing::info!(
            rate_per_minute = config.rate_per_minute,
            failure_rate_pct = config.failure_rate_pct,
            latency_ms = config.latency_ms,
            corruption_pct = config.corruption_pct,
            "Load config updated"
        );

        Ok(ConfigChange {
            config,
            adjusted: validated.adjustments,
        })
    }

    /// Start the run loop. Returns `false` if it was already running.
    pub fn start(&self) -> bool {
        let mut runner = self.runner.lock();
        if runner.active.is_some() {
            tracing::warn!("Load generator is already running");
            return false;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let previous = runner.draining.take();
        let run_loop = RunLoop::new(self.shared.clone(), stop_rx);
        let handle = tokio::spawn(run_loop.run(previous));

        runner.active = Some(ActiveRun {
            stop: stop_tx,
            handle,
        });
        self.running.store(true, Ordering::SeqCst);
        metrics::record_running(true);

        let config = self.config();
        tracing::info!(
            rate_per_minute = config.rate_per_minute,
            failure_rate_pct = config.failure_rate_pct,
            latency_ms = config.latency_ms,
            corruption_pct = config.corruption_pct,
            "Load generator started"
        );
        true
    }

    /// Signal the run loop to stop. Returns immediately; `false` if it was
    /// not running.
    pub fn stop(&self) -> bool {
        let mut runner = self.runner.lock();
        let Some(active) = runner.active.take() else {
            tracing::warn!("Load generator is not running");
            return false;
        };

        let _ = active.stop.send(true);
        runner.draining = Some(active.handle);
        self.running.store(false, Ordering::SeqCst);
        metrics::record_running(false);

        tracing::info!("Load generator stopping");
        true
    }

    /// Send one well-formed message right now, bypassing fault injection.
    pub async fn invoke_once(&self) -> InvokeOutcome {
        let message = SyntheticMessage::generate(MessageKind::Single);
        tracing::info!(message_id = %message.id, "Sending single-invoke message");

        let (outcome, elapsed) =
            dispatch(self.shared.gateway.as_ref(), &message, self.shared.send_timeout).await;
        self.shared.stats.record_invocation();
        metrics::record_invocation(outcome.succeeded);

        if outcome.succeeded {
            tracing::info!(
                message_id = %message.id,
                external_id = outcome.external_id.as_deref().unwrap_or_default(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Single message sent"
            );
        } else {
            tracing::error!(
                message_id = %message.id,
                generated_at = %message.generated_at,
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "Failed to send single message"
            );
        }

        InvokeOutcome {
            message_id: message.id,
            sent: outcome.succeeded,
            external_id: outcome.external_id,
            error: outcome.error,
        }
    }

    /// Stop and wait up to `grace` for the loop task to exit.
    pub async fn shutdown(&self, grace: Duration) {
        self.stop();
        let handle = self.runner.lock().draining.take();
        let Some(handle) = handle else {
            return;
        };

        match tokio::time::timeout(grace, handle).await {
            Ok(_) => tracing::info!("Run loop drained"),
            Err(_) => tracing::warn!(grace_secs = grace.as_secs(), "Run loop did not exit within grace period"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RecordingGateway;

    fn surface(gateway: Arc<RecordingGateway>) -> ControlSurface {
        ControlSurface::with_faults(gateway, EngineOptions::default(), FaultInjector::seeded(3))
    }

    #[tokio::test]
    async fn test_initial_status() {
        let control = surface(Arc::new(RecordingGateway::new()));
        let status = control.status();
        assert_eq!(status.status, RunStatus::Stopped);
        assert_eq!(status.config, LoadConfig::default());
        assert_eq!(status.stats, StatsSnapshot::default());
    }

    #[tokio::test]
    async fn test_start_stop_are_idempotent() {
        let control = surface(Arc::new(RecordingGateway::new()));

        assert!(!control.stop());
        assert!(control.start());
        assert!(!control.start());
        assert_eq!(control.run_status(), RunStatus::Running);

        assert!(control.stop());
        assert!(!control.stop());
        assert_eq!(control.run_status(), RunStatus::Stopped);

        control.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_update_does_not_touch_run_state() {
        let control = surface(Arc::new(RecordingGateway::new()));
        let change = control
            .update_config(&ConfigUpdate { rate_per_minute: Some(1000), ..Default::default() })
            .unwrap();

        assert_eq!(change.config.rate_per_minute, 300);
        assert_eq!(change.adjusted.len(), 1);
        assert_eq!(control.config().rate_per_minute, 300);
        assert_eq!(control.run_status(), RunStatus::Stopped);
    }

    #[tokio::test]
    async fn test_strict_policy_leaves_config_untouched() {
        let options = EngineOptions { policy: ValidationPolicy::Reject, ..Default::default() };
        let control = ControlSurface::with_faults(
            Arc::new(RecordingGateway::new()),
            options,
            FaultInjector::seeded(3),
        );

        let result = control.update_config(&ConfigUpdate {
            rate_per_minute: Some(10),
            failure_rate_pct: Some(150),
            ..Default::default()
        });
        assert!(matches!(result, Err(ControlError::OutOfRange { .. })));
        assert_eq!(control.config(), LoadConfig::default());
    }

    #[test]
    fn test_status_serializes_flat() {
        let snapshot = StatusSnapshot {
            status: RunStatus::Running,
            config: LoadConfig::default(),
            stats: StatsSnapshot::default(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "Running");
        assert_eq!(json["rate_per_minute"], 60);
        assert_eq!(json["failure_rate_pct"], 0);
        assert_eq!(json["latency_ms"], 0);
        assert_eq!(json["corruption_pct"], 0);
        assert_eq!(json["stats"]["sent"], 0);
    }
}
