//! Connection records and identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a connection, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ConnectionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ConnectionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Endpoint-specific settings.
///
/// Serialized with a `type` tag (`"website"` / `"ssh"`) and camelCase fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ConnectionConfig {
    Website {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        check_path: Option<String>,
    },
    Ssh {
        host: String,
        port: u16,
        username: String,
        #[serde(default)]
        wol_enabled: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mac_address: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        broadcast_addr: Option<String>,
    },
}

impl ConnectionConfig {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectionConfig::Website { .. } => "website",
            ConnectionConfig::Ssh { .. } => "ssh",
        }
    }
}

/// A monitored endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
    /// Presentation position. Neither contiguous nor unique.
    #[serde(default)]
    pub order: i32,
    pub config: ConnectionConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    /// Create a connection with a fresh identifier and timestamps set to now.
    pub fn new(name: impl Into<String>, config: ConnectionConfig, order: i32) -> Self {
        let now = Utc::now();
        Self {
            id: ConnectionId::generate(),
            name: name.into(),
            icon: None,
            icon_color: None,
            order,
            config,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload for creating a connection; the identifier and timestamps are
/// assigned on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConnection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    pub config: ConnectionConfig,
}

impl NewConnection {
    /// Build the connection, placing it at `default_order` unless the
    /// payload asked for a specific position.
    pub fn into_connection(self, default_order: i32) -> Connection {
        let mut connection = Connection::new(self.name, self.config, self.order.unwrap_or(default_order));
        connection.icon = self.icon;
        connection.icon_color = self.icon_color;
        connection
    }

    /// Replace the editable fields of `existing`, keeping its identity and
    /// creation time. Order is kept unless the payload sets one.
    pub fn apply_to(self, existing: &Connection) -> Connection {
        Connection {
            id: existing.id,
            name: self.name,
            icon: self.icon,
            icon_color: self.icon_color,
            order: self.order.unwrap_or(existing.order),
            config: self.config,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        }
    }
}
