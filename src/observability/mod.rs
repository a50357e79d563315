//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine and HTTP layer produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (collected by the node's log agent)
//!     → Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
