//! Controllable synthetic traffic generator for telemetry pipelines.

pub mod config;
pub mod engine;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use engine::ControlSurface;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
