//! Health result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::registry::ConnectionId;

/// Reachability of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Online,
    Offline,
    Degraded,
    Unknown,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Online => "online",
            HealthStatus::Offline => "offline",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unknown => "unknown",
        }
    }
}

/// Outcome of the most recent probe of one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResult {
    pub connection_id: ConnectionId,
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthResult {
    pub fn online(connection_id: ConnectionId, latency: Duration) -> Self {
        Self::with(connection_id, HealthStatus::Online, Some(latency), None)
    }

    pub fn degraded(connection_id: ConnectionId, latency: Duration) -> Self {
        Self::with(connection_id, HealthStatus::Degraded, Some(latency), None)
    }

    pub fn offline(connection_id: ConnectionId, error: impl Into<String>) -> Self {
        Self::with(connection_id, HealthStatus::Offline, None, Some(error.into()))
    }

    /// Result recorded when the probe itself failed.
    pub fn unknown(connection_id: ConnectionId, error: impl Into<String>) -> Self {
        Self::with(connection_id, HealthStatus::Unknown, None, Some(error.into()))
    }

    /// Online, or degraded when `latency` exceeds `degraded_after`.
    pub fn reachable(connection_id: ConnectionId, latency: Duration, degraded_after: Option<Duration>) -> Self {
        match degraded_after {
            Some(limit) if latency > limit => Self::degraded(connection_id, latency),
            _ => Self::online(connection_id, latency),
        }
    }

    fn with(
        connection_id: ConnectionId,
        status: HealthStatus,
        latency: Option<Duration>,
        error: Option<String>,
    ) -> Self {
        Self {
            connection_id,
            status,
            latency_ms: latency.map(|l| l.as_millis().min(u64::MAX as u128) as u64),
            error,
            checked_at: Utc::now(),
        }
    }
}
