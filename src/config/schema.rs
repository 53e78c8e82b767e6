//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the endpoint monitor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Where connection records are kept.
    pub storage: StorageConfig,

    /// Periodic health polling.
    pub polling: PollingConfig,

    /// Built-in probe settings.
    pub probe: ProbeConfig,

    /// Management API.
    pub api: ApiConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Connection storage configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding connections. Unset means the platform config dir.
    pub path: Option<PathBuf>,
}

/// Health polling configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Start polling the registry on startup.
    pub enabled: bool,

    /// Poll interval in milliseconds.
    pub interval_ms: u64,

    /// Deadline for one probe in milliseconds.
    pub probe_timeout_ms: u64,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 30_000,
            probe_timeout_ms: 10_000,
        }
    }
}

/// Settings for the built-in website and SSH probes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// HTTP request timeout in seconds.
    pub http_timeout_secs: u64,

    /// TCP connect timeout in seconds.
    pub tcp_timeout_secs: u64,

    /// Accept self-signed certificates (common on home-lab services).
    pub accept_invalid_certs: bool,

    /// User-Agent header for website probes.
    pub user_agent: String,

    /// Latency above which a reachable endpoint is reported as degraded.
    pub degraded_latency_ms: Option<u64>,
}

impl ProbeConfig {
    pub fn degraded_after(&self) -> Option<Duration> {
        self.degraded_latency_ms.map(Duration::from_millis)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: 5,
            tcp_timeout_secs: 5,
            accept_invalid_certs: true,
            user_agent: concat!("endpoint-watch/", env!("CARGO_PKG_VERSION")).to_string(),
            degraded_latency_ms: None,
        }
    }
}

/// Management API configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Serve the management API.
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:7878").
    pub bind_address: String,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:7878".to_string(),
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
