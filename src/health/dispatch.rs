//! Probe dispatch.
//!
//! # Responsibilities
//! - Run the probe capability for one connection under a deadline
//! - Turn every failure into an `unknown` result
//! - Record the outcome in the health cache
//!
//! # Design Decisions
//! - `check` never fails; callers only ever see degraded data
//! - The probe runs in its own task so a panicking prober is contained
//! - A timed-out probe task is aborted

use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time;

use crate::health::cache::HealthCache;
use crate::health::types::HealthResult;
use crate::observability::metrics;
use crate::registry::Connection;

/// Default deadline for a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a probe produced no result.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid probe target: {0}")]
    InvalidTarget(String),

    #[error("Probe task failed: {0}")]
    Panicked(String),
}

/// Capability that determines the health of one endpoint.
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    async fn probe(&self, connection: &Connection) -> Result<HealthResult, ProbeError>;
}

/// Runs probes and writes their normalized results to the cache.
#[derive(Clone)]
pub struct ProbeDispatcher {
    prober: Arc<dyn Prober>,
    cache: HealthCache,
    timeout: Duration,
}

impl ProbeDispatcher {
    pub fn new(prober: Arc<dyn Prober>, cache: HealthCache, timeout: Duration) -> Self {
        Self { prober, cache, timeout }
    }

    pub fn cache(&self) -> &HealthCache {
        &self.cache
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe one connection and cache the outcome. Always yields a result.
    pub async fn check(&self, connection: &Connection) -> HealthResult {
        let started = Instant::now();

        let result = match self.run_probe(connection).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    connection_id = %connection.id,
                    name = %connection.name,
                    error = %e,
                    "Health check failed"
                );
                HealthResult::unknown(connection.id, e.to_string())
            }
        };

        metrics::record_probe(connection.config.kind(), result.status, started);
        self.cache.set(connection.id, result.clone());
        result
    }

    /// Probe every connection concurrently. Results come back in input order.
    pub async fn check_all(&self, connections: &[Connection]) -> Vec<HealthResult> {
        join_all(connections.iter().map(|c| self.check(c))).await
    }

    async fn run_probe(&self, connection: &Connection) -> Result<HealthResult, ProbeError> {
        let prober = self.prober.clone();
        let target = connection.clone();
        let mut task = tokio::spawn(async move { prober.probe(&target).await });

        match time::timeout(self.timeout, &mut task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_error)) => Err(ProbeError::Panicked(join_error.to_string())),
            Err(_) => {
                task.abort();
                Err(ProbeError::Timeout(self.timeout))
            }
        }
    }
}
