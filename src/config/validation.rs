//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require the settings without which no message can ever be sent
//! - Check addresses and URLs parse
//!
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("queue.url is required (set it in the config file or SQS_QUEUE_URL)")]
    MissingQueueUrl,

    #[error("queue.url '{url}' is not a valid URL: {reason}")]
    InvalidQueueUrl { url: String, reason: String },

    #[error("queue.endpoint_url '{url}' is not a valid URL: {reason}")]
    InvalidEndpointUrl { url: String, reason: String },

    #[error("queue.send_timeout_ms must be greater than zero")]
    ZeroSendTimeout,

    #[error("queue.region must not be empty")]
    EmptyRegion,

    #[error("{field} '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.queue.url.as_deref().map(str::trim) {
        None | Some("") => errors.push(ValidationError::MissingQueueUrl),
        Some(raw) => {
            if let Err(e) = Url::parse(raw) {
                errors.push(ValidationError::InvalidQueueUrl {
                    url: raw.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if let Some(endpoint) = &config.queue.endpoint_url {
        if let Err(e) = Url::parse(endpoint) {
            errors.push(ValidationError::InvalidEndpointUrl {
                url: endpoint.clone(),
                reason: e.to_string(),
            });
        }
    }

    if config.queue.send_timeout_ms == 0 {
        errors.push(ValidationError::ZeroSendTimeout);
    }

    if config.queue.region.trim().is_empty() {
        errors.push(ValidationError::EmptyRegion);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.queue.url = Some("https://sqs.us-east-1.amazonaws.com/123/loadgen".into());
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_missing_queue_url_is_reported() {
        let config = AppConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingQueueUrl]);

        let mut blank = valid();
        blank.queue.url = Some("   ".into());
        assert!(validate_config(&blank)
            .unwrap_err()
            .contains(&ValidationError::MissingQueueUrl));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.queue.url = Some("not a url".into());
        config.queue.send_timeout_ms = 0;
        config.listener.bind_address = "localhost".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::InvalidQueueUrl { .. }));
        assert!(errors.contains(&ValidationError::ZeroSendTimeout));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = valid();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
