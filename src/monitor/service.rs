//! The monitoring service.
//!
//! Owns the registry, the health cache, the dispatcher and the poll
//! scheduler. Constructed once at startup and shared with the API.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::MonitorConfig;
use crate::health::{HealthCache, HealthResult, PollScheduler, ProbeDispatcher, Prober};
use crate::probe::EndpointProber;
use crate::registry::{
    Connection, ConnectionId, ConnectionRegistry, ConnectionStore, JsonFileStore, NewConnection, RegistryResult,
    StoreError,
};
use crate::wol::{self, WolError};

/// Failure to assemble the service from configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to open connection store: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failure to wake a connection.
#[derive(Debug, Error)]
pub enum WakeError {
    #[error("Connection not found: {0}")]
    NotFound(ConnectionId),

    #[error(transparent)]
    Wol(#[from] WolError),
}

pub struct MonitorService {
    registry: ConnectionRegistry,
    dispatcher: ProbeDispatcher,
    scheduler: PollScheduler,
}

impl MonitorService {
    pub fn new(store: Arc<dyn ConnectionStore>, prober: Arc<dyn Prober>, probe_timeout: Duration) -> Self {
        let dispatcher = ProbeDispatcher::new(prober, HealthCache::new(), probe_timeout);
        Self {
            registry: ConnectionRegistry::new(store),
            scheduler: PollScheduler::new(dispatcher.clone()),
            dispatcher,
        }
    }

    /// Build the service with the JSON file store and the built-in prober.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, BuildError> {
        let store = match &config.storage.path {
            Some(path) => JsonFileStore::new(path.clone()),
            None => JsonFileStore::in_default_dir()?,
        };
        tracing::info!(path = %store.path().display(), "Using connection store");

        let prober = EndpointProber::from_config(&config.probe)?;
        Ok(Self::new(Arc::new(store), Arc::new(prober), config.polling.probe_timeout()))
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &HealthCache {
        self.dispatcher.cache()
    }

    /// Reload connections from the store. Returns whether the store answered.
    pub async fn load(&self) -> bool {
        let synced = self.registry.load().await;
        if synced {
            self.sweep_cache();
        }
        synced
    }

    /// All connections ordered for presentation.
    pub fn sorted_view(&self) -> Vec<Connection> {
        self.registry.sorted_view()
    }

    pub fn connection(&self, id: ConnectionId) -> Option<Connection> {
        self.registry.get(id)
    }

    pub async fn save_connection(&self, connection: Connection) -> RegistryResult<()> {
        self.registry.save(connection).await?;
        self.after_mutation();
        Ok(())
    }

    /// Create a connection from a payload, appending it after the current last one.
    pub async fn create_connection(&self, payload: NewConnection) -> RegistryResult<Connection> {
        let connection = payload.into_connection(self.registry.next_order());
        self.registry.save(connection.clone()).await?;
        tracing::info!(connection_id = %connection.id, kind = connection.config.kind(), "Connection created");
        self.after_mutation();
        Ok(self.registry.get(connection.id).unwrap_or(connection))
    }

    pub async fn delete_connection(&self, id: ConnectionId) -> RegistryResult<()> {
        self.registry.delete(id).await?;
        tracing::info!(connection_id = %id, "Connection deleted");
        self.after_mutation();
        Ok(())
    }

    pub async fn reorder_connections(&self, ids: &[ConnectionId]) -> RegistryResult<()> {
        self.registry.reorder(ids).await?;
        self.after_mutation();
        Ok(())
    }

    /// Start polling an explicit connection set.
    pub fn start_polling(&self, connections: Vec<Connection>, interval: Duration) {
        self.scheduler.start(connections, interval);
    }

    /// Start polling every registered connection. The polled set follows
    /// later mutations.
    pub fn poll_registry(&self, interval: Duration) {
        self.scheduler.follow(self.registry.sorted_view(), interval);
    }

    /// Returns whether a session was running.
    pub fn stop_polling(&self) -> bool {
        self.scheduler.stop()
    }

    pub fn is_polling(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn polling_period(&self) -> Option<Duration> {
        self.scheduler.period()
    }

    /// Probe one connection now. Never fails.
    pub async fn check_one(&self, connection: &Connection) -> HealthResult {
        self.dispatcher.check(connection).await
    }

    /// Probe the given connections concurrently. Never fails.
    pub async fn check_all(&self, connections: &[Connection]) -> Vec<HealthResult> {
        self.dispatcher.check_all(connections).await
    }

    /// Probe every registered connection.
    pub async fn check_registry(&self) -> Vec<HealthResult> {
        let connections = self.registry.sorted_view();
        self.dispatcher.check_all(&connections).await
    }

    pub fn get_health(&self, id: ConnectionId) -> Option<HealthResult> {
        self.cache().get(&id)
    }

    pub fn health_snapshot(&self) -> HashMap<ConnectionId, HealthResult> {
        self.cache().snapshot()
    }

    /// Send a Wake-on-LAN packet for a registered SSH connection.
    pub async fn wake(&self, id: ConnectionId) -> Result<(), WakeError> {
        let connection = self.registry.get(id).ok_or(WakeError::NotFound(id))?;
        wol::wake(&connection).await?;
        tracing::info!(connection_id = %id, "Wake-on-LAN packet sent");
        Ok(())
    }

    /// A failed reload leaves an empty view. Neither the cache nor the
    /// polled set is touched until the store answers again.
    fn after_mutation(&self) {
        if !self.registry.is_synced() {
            tracing::warn!("Registry out of sync after mutation, keeping polled set");
            return;
        }
        self.sweep_cache();
        self.scheduler.retarget(self.registry.sorted_view());
    }

    fn sweep_cache(&self) {
        let live: HashSet<ConnectionId> = self.registry.snapshot().iter().map(|c| c.id).collect();
        self.cache().retain_ids(&live);
    }
}
