//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (SQS_QUEUE_URL, AWS_REGION, ...)
//!     → validation.rs (semantic checks, fatal on failure)
//!     → AppConfig (validated, immutable)
//! ```
//!
//! Process configuration is immutable once loaded. The live traffic
//! settings (rate, faults) are runtime state owned by the engine and are
//! changed through the control API, not by reloading this file.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ensure_valid, load_config, ConfigError};
pub use schema::{
    AppConfig, ControlConfig, ListenerConfig, LoadDefaults, ObservabilityConfig, QueueConfig,
    ShutdownConfig,
};
pub use validation::ValidationError;
