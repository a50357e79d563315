//! Load generator engine.
//!
//! # Data Flow
//! ```text
//! HTTP control request
//!     → control.rs (ControlSurface: validate, swap config, start/stop)
//!     → run_loop.rs (background task, one per Running period)
//!         → settings.rs (atomic LoadConfig snapshot)
//!         → fault.rs (corrupt / delay / drop)
//!         → rate.rs (pause between requests)
//!         → gateway (send to queue)
//!         → stats.rs (counters)
//! ```
//!
//! # Design Decisions
//! - One `ControlSurface` per process, shared via `Arc`; no global state
//! - Config changes apply from the next iteration on
//! - Stop is cooperative and never aborts a send in progress

pub mod control;
pub mod error;
pub mod fault;
pub mod message;
pub mod rate;
mod run_loop;
pub mod settings;
pub mod stats;

pub use control::{
    ConfigChange, ControlSurface, EngineOptions, InvokeOutcome, RunStatus, StatusSnapshot,
};
pub use error::ControlError;
pub use fault::FaultInjector;
pub use message::{is_well_formed, MessageKind, SyntheticMessage};
pub use rate::inter_request_delay;
pub use settings::{ConfigUpdate, LoadConfig, ValidationPolicy};
pub use stats::StatsSnapshot;
