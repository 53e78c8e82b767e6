//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals and timeouts > 0)
//! - Validate addresses the daemon will bind
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - A probe timeout longer than the poll interval is allowed; ticks overlap

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::MonitorConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("api.api_key must not be empty when the API is enabled")]
    EmptyApiKey,

    #[error("unknown log level '{0}'")]
    InvalidLogLevel(String),
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let positive = [
        ("polling.interval_ms", config.polling.interval_ms),
        ("polling.probe_timeout_ms", config.polling.probe_timeout_ms),
        ("probe.http_timeout_secs", config.probe.http_timeout_secs),
        ("probe.tcp_timeout_secs", config.probe.tcp_timeout_secs),
        ("api.request_timeout_secs", config.api.request_timeout_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if config.api.enabled {
        if config.api.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field: "api.bind_address",
                value: config.api.bind_address.clone(),
            });
        }
        if config.api.api_key.trim().is_empty() {
            errors.push(ValidationError::EmptyApiKey);
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
