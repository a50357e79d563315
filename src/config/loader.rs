//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
///
/// Every variant is fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read a TOML file into an [`AppConfig`]. Does not validate.
pub fn load_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Overlay environment variables on top of file values.
///
/// `lookup` is injected so tests don't touch the process environment.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get("SQS_QUEUE_URL") {
        config.queue.url = Some(url);
    }
    if let Some(region) = get("AWS_REGION") {
        config.queue.region = region;
    }
    if let Some(endpoint) = get("SQS_ENDPOINT_URL") {
        config.queue.endpoint_url = Some(endpoint);
    }
    if let Some(addr) = get("LOADGEN_BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(key) = get("LOADGEN_API_KEY") {
        config.control.api_key = Some(key);
    }
    if let Some(level) = get("LOADGEN_LOG_LEVEL") {
        config.observability.log_level = level;
    }
}

/// Load the optional file, apply process environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Validate, mapping failures into the fatal [`ConfigError`].
pub fn ensure_valid(config: &AppConfig) -> Result<(), ConfigError> {
    validate_config(config).map_err(ConfigError::Validation)
}
