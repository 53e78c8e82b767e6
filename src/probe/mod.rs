//! Built-in probe capability.
//!
//! # Data Flow
//! ```text
//! ProbeDispatcher
//!     → EndpointProber::probe(connection)
//!         Website → http.rs (GET url + checkPath)
//!         Ssh     → tcp.rs  (connect host:port)
//!     → HealthResult (online / degraded / offline)
//! ```
//!
//! # Design Decisions
//! - An unreachable endpoint is a result (offline), not an error
//! - Only a malformed target is reported as `ProbeError`
//! - Latency above the configured limit downgrades online to degraded

pub mod http;
pub mod tcp;

use async_trait::async_trait;
use std::time::Duration;

use crate::config::ProbeConfig;
use crate::health::{HealthResult, ProbeError, Prober};
use crate::registry::{Connection, ConnectionConfig};

pub use self::http::HttpProbe;
pub use self::tcp::TcpProbe;

/// Probes websites over HTTP and SSH hosts over TCP.
#[derive(Debug, Clone)]
pub struct EndpointProber {
    http: HttpProbe,
    tcp: TcpProbe,
}

impl EndpointProber {
    pub fn from_config(config: &ProbeConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: HttpProbe::from_config(config)?,
            tcp: TcpProbe::new(Duration::from_secs(config.tcp_timeout_secs), config.degraded_after()),
        })
    }
}

#[async_trait]
impl Prober for EndpointProber {
    async fn probe(&self, connection: &Connection) -> Result<HealthResult, ProbeError> {
        match &connection.config {
            ConnectionConfig::Website { url, check_path } => {
                self.http.check(connection.id, url, check_path.as_deref()).await
            }
            ConnectionConfig::Ssh { host, port, .. } => self.tcp.check(connection.id, host, *port).await,
        }
    }
}
