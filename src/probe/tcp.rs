//! SSH host reachability via TCP connect.

use std::time::{Duration, Instant};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;

use crate::health::{HealthResult, ProbeError};
use crate::registry::ConnectionId;

/// Opens a TCP connection to `host:port` and drops it.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    connect_timeout: Duration,
    degraded_after: Option<Duration>,
}

impl TcpProbe {
    pub fn new(connect_timeout: Duration, degraded_after: Option<Duration>) -> Self {
        Self { connect_timeout, degraded_after }
    }

    pub async fn check(&self, connection_id: ConnectionId, host: &str, port: u16) -> Result<HealthResult, ProbeError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(ProbeError::InvalidTarget("empty host".into()));
        }

        let addr = match lookup_host((host, port)).await {
            Ok(mut addrs) => match addrs.next() {
                Some(addr) => addr,
                None => return Ok(HealthResult::offline(connection_id, "Could not resolve host")),
            },
            Err(e) => return Ok(HealthResult::offline(connection_id, e.to_string())),
        };

        let start = Instant::now();
        match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Ok(HealthResult::reachable(connection_id, start.elapsed(), self.degraded_after)),
            Ok(Err(e)) => Ok(HealthResult::offline(connection_id, e.to_string())),
            Err(_) => Ok(HealthResult::offline(connection_id, "Connection timed out")),
        }
    }
}
