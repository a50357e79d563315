//! Control API handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::engine::{
    ConfigChange, ConfigUpdate, ControlError, InvokeOutcome, LoadConfig, RunStatus,
    StatusSnapshot,
};
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct RunTransition {
    pub status: RunStatus,
    /// False when the call was a no-op.
    pub changed: bool,
    #[serde(flatten)]
    pub config: LoadConfig,
}

/// Parse an optional JSON body. Empty bodies mean "no fields".
fn parse_update(body: &Bytes) -> Result<ConfigUpdate, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ConfigUpdate::default());
    }
    serde_json::from_slice(body).map_err(|e| ControlError::Malformed(e.to_string()).into())
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.control.status())
}

pub async fn update_config(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ConfigChange>, ApiError> {
    let update = parse_update(&body)?;
    let change = state.control.update_config(&update)?;
    Ok(Json(change))
}

/// Start the loop, optionally applying a config update first.
pub async fn start(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RunTransition>, ApiError> {
    let update = parse_update(&body)?;
    if !update.is_empty() {
        state.control.update_config(&update)?;
    }
    let changed = state.control.start();
    Ok(Json(RunTransition {
        status: state.control.run_status(),
        changed,
        config: state.control.config(),
    }))
}

pub async fn stop(State(state): State<AppState>) -> Json<RunTransition> {
    let changed = state.control.stop();
    Json(RunTransition {
        status: state.control.run_status(),
        changed,
        config: state.control.config(),
    })
}

pub async fn invoke_once(State(state): State<AppState>) -> Json<InvokeOutcome> {
    Json(state.control.invoke_once().await)
}
