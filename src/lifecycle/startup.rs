//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration (fail fast: any error is fatal)
//! - Build the queue gateway and the control surface
//! - Honour `load.autostart`

use std::sync::Arc;

use crate::config::{ensure_valid, AppConfig, ConfigError, ValidationError};
use crate::engine::{ControlSurface, EngineOptions};
use crate::gateway::{SendGateway, SqsGateway};

/// Validate `config` and build the engine on top of Amazon SQS.
pub async fn build_control(config: &AppConfig) -> Result<Arc<ControlSurface>, ConfigError> {
    ensure_valid(config)?;

    let gateway = SqsGateway::new(&config.queue)
        .await
        .ok_or_else(|| ConfigError::Validation(vec![ValidationError::MissingQueueUrl]))?;

    Ok(assemble(Arc::new(gateway), config))
}

/// Build the engine on top of any gateway.
pub fn assemble(gateway: Arc<dyn SendGateway>, config: &AppConfig) -> Arc<ControlSurface> {
    let control = Arc::new(ControlSurface::new(gateway, EngineOptions::from_config(config)));
    if config.load.autostart {
        control.start();
    }
    control
}
