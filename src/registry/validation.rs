//! Connection validation.
//!
//! Applied at the API boundary before a record reaches the store. Collects
//! every problem instead of stopping at the first.

use thiserror::Error;
use url::Url;

use crate::registry::types::{Connection, ConnectionConfig};
use crate::wol::MacAddress;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("invalid website URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("check path '{0}' must start with '/'")]
    InvalidCheckPath(String),

    #[error("SSH host must not be empty")]
    EmptyHost,

    #[error("SSH port must not be 0")]
    InvalidPort,

    #[error("SSH username must not be empty")]
    EmptyUsername,

    #[error("invalid MAC address '{0}'")]
    InvalidMac(String),
}

/// Validate a connection record.
pub fn validate_connection(connection: &Connection) -> Result<(), Vec<ConnectionValidationError>> {
    let mut errors = Vec::new();

    if connection.name.trim().is_empty() {
        errors.push(ConnectionValidationError::EmptyName);
    }

    match &connection.config {
        ConnectionConfig::Website { url, check_path } => {
            match Url::parse(url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => errors.push(ConnectionValidationError::InvalidUrl {
                    url: url.clone(),
                    reason: format!("unsupported scheme '{}'", parsed.scheme()),
                }),
                Err(e) => errors.push(ConnectionValidationError::InvalidUrl {
                    url: url.clone(),
                    reason: e.to_string(),
                }),
            }
            if let Some(path) = check_path {
                if !path.is_empty() && !path.starts_with('/') {
                    errors.push(ConnectionValidationError::InvalidCheckPath(path.clone()));
                }
            }
        }
        ConnectionConfig::Ssh { host, port, username, mac_address, .. } => {
            if host.trim().is_empty() {
                errors.push(ConnectionValidationError::EmptyHost);
            }
            if *port == 0 {
                errors.push(ConnectionValidationError::InvalidPort);
            }
            if username.trim().is_empty() {
                errors.push(ConnectionValidationError::EmptyUsername);
            }
            if let Some(mac) = mac_address {
                if mac.parse::<MacAddress>().is_err() {
                    errors.push(ConnectionValidationError::InvalidMac(mac.clone()));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
