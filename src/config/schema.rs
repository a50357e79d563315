//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the load
//! generator. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the load generator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Control API listener.
    pub listener: ListenerConfig,

    /// Outbound message queue.
    pub queue: QueueConfig,

    /// Initial traffic shape and fault settings.
    pub load: LoadDefaults,

    /// Control surface policy.
    pub control: ControlConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Shutdown behaviour.
    pub shutdown: ShutdownConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout for control calls, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Message queue configuration.
///
/// `url` has no default: a missing queue URL is fatal at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// SQS queue URL.
    pub url: Option<String>,

    /// AWS region of the queue.
    pub region: String,

    /// Custom endpoint (LocalStack, ElasticMQ).
    pub endpoint_url: Option<String>,

    /// Upper bound on a single send call, in milliseconds.
    pub send_timeout_ms: u64,

    /// Force FIFO attributes on or off. Inferred from a `.fifo` URL suffix when unset.
    pub fifo: Option<bool>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: None,
            region: "us-east-1".to_string(),
            endpoint_url: None,
            send_timeout_ms: 5_000,
            fifo: None,
        }
    }
}

impl QueueConfig {
    /// Whether messages must carry FIFO group and deduplication ids.
    pub fn is_fifo(&self) -> bool {
        self.fifo.unwrap_or_else(|| {
            self.url
                .as_deref()
                .map(|url| url.trim_end_matches('/').ends_with(".fifo"))
                .unwrap_or(false)
        })
    }
}

/// Load settings applied when the process starts.
///
/// Values are signed so that out-of-range input survives parsing and can be
/// clamped (or rejected) by the same rules the control API uses.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadDefaults {
    pub rate_per_minute: i64,
    pub failure_rate_pct: i64,
    pub latency_ms: i64,
    pub corruption_pct: i64,

    /// Seed for the fault injector RNG. Entropy when unset.
    pub seed: Option<u64>,

    /// Start the run loop immediately after boot.
    pub autostart: bool,
}

impl Default for LoadDefaults {
    fn default() -> Self {
        Self {
            rate_per_minute: 60,
            failure_rate_pct: 0,
            latency_ms: 0,
            corruption_pct: 0,
            seed: None,
            autostart: false,
        }
    }
}

/// Control surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ControlConfig {
    /// Bearer token required on mutating routes. Open when unset.
    pub api_key: Option<String>,

    /// Reject out-of-range config values instead of clamping them.
    pub strict_validation: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long to wait for the run loop to finish its in-flight request.
    pub grace_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { grace_secs: 10 }
    }
}
