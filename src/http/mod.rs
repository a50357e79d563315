//! HTTP control surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout, body limit)
//!     → auth.rs (bearer token on mutating routes, when configured)
//!     → handlers.rs (status / config / start / stop / invoke-once)
//!     → engine::ControlSurface
//! ```

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
