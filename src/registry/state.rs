//! In-memory connection registry.
//!
//! # Responsibilities
//! - Mirror the store's connection set
//! - Serve ordered snapshots to readers
//! - Forward mutations to the store and resynchronize afterwards
//!
//! # Design Decisions
//! - The set is swapped wholesale (`ArcSwap`); readers never block
//! - Reload failure empties the set rather than keeping stale data
//! - Mutation failure propagates and leaves the set untouched
//! - Reloads are serialized, so the last reload to start is the last to land

use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::observability::metrics;
use crate::registry::store::{ConnectionStore, StoreError};
use crate::registry::types::{Connection, ConnectionId};

/// A mutation the store rejected.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to save connection {id}: {source}")]
    Save {
        id: ConnectionId,
        #[source]
        source: StoreError,
    },

    #[error("Failed to delete connection {id}: {source}")]
    Delete {
        id: ConnectionId,
        #[source]
        source: StoreError,
    },

    #[error("Failed to reorder connections: {0}")]
    Reorder(#[source] StoreError),
}

impl RegistryError {
    /// The underlying store failure.
    pub fn store_error(&self) -> &StoreError {
        match self {
            RegistryError::Save { source, .. } | RegistryError::Delete { source, .. } => source,
            RegistryError::Reorder(source) => source,
        }
    }
}

/// Result type for registry mutations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Order-preserving view of the user's connections.
pub struct ConnectionRegistry {
    store: Arc<dyn ConnectionStore>,
    connections: ArcSwap<Vec<Connection>>,
    synced: AtomicBool,
    reload: Mutex<()>,
}

impl ConnectionRegistry {
    /// Create an empty registry. Call [`load`](Self::load) to populate it.
    pub fn new(store: Arc<dyn ConnectionStore>) -> Self {
        Self {
            store,
            connections: ArcSwap::from_pointee(Vec::new()),
            synced: AtomicBool::new(false),
            reload: Mutex::new(()),
        }
    }

    /// Replace the in-memory set with the store's contents.
    ///
    /// Never fails: on error the set becomes empty and the error is logged.
    /// Returns whether the store answered.
    pub async fn load(&self) -> bool {
        // Held across list and swap so an older listing never overwrites a newer one.
        let _reload = self.reload.lock().await;
        match self.store.list().await {
            Ok(connections) => {
                tracing::debug!(count = connections.len(), "Connections loaded");
                metrics::record_connection_count(connections.len());
                self.connections.store(Arc::new(connections));
                self.synced.store(true, Ordering::Release);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load connections");
                metrics::record_connection_count(0);
                self.connections.store(Arc::new(Vec::new()));
                self.synced.store(false, Ordering::Release);
                false
            }
        }
    }

    /// Whether the last reload reached the store.
    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    /// Persist a connection, then reload.
    pub async fn save(&self, connection: Connection) -> RegistryResult<()> {
        let id = connection.id;
        if let Err(source) = self.store.persist(connection).await {
            tracing::error!(connection_id = %id, error = %source, "Failed to save connection");
            return Err(RegistryError::Save { id, source });
        }
        self.load().await;
        Ok(())
    }

    /// Delete a connection, then reload.
    pub async fn delete(&self, id: ConnectionId) -> RegistryResult<()> {
        if let Err(source) = self.store.delete(id).await {
            tracing::error!(connection_id = %id, error = %source, "Failed to delete connection");
            return Err(RegistryError::Delete { id, source });
        }
        self.load().await;
        Ok(())
    }

    /// Hand a complete target ordering to the store, then reload.
    pub async fn reorder(&self, ids: &[ConnectionId]) -> RegistryResult<()> {
        if let Err(source) = self.store.reorder(ids).await {
            tracing::error!(count = ids.len(), error = %source, "Failed to reorder connections");
            return Err(RegistryError::Reorder(source));
        }
        self.load().await;
        Ok(())
    }

    /// Current set in store order.
    pub fn snapshot(&self) -> Arc<Vec<Connection>> {
        self.connections.load_full()
    }

    /// Current set sorted ascending by `order`, ties kept in store order.
    pub fn sorted_view(&self) -> Vec<Connection> {
        sort_by_order(&self.connections.load())
    }

    pub fn get(&self, id: ConnectionId) -> Option<Connection> {
        self.connections.load().iter().find(|c| c.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.connections.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.load().is_empty()
    }

    /// Position after the last connection, for appending new entries.
    pub fn next_order(&self) -> i32 {
        self.connections
            .load()
            .iter()
            .map(|c| c.order)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }
}

/// Stable ascending sort by `order`. Does not touch the input.
pub fn sort_by_order(connections: &[Connection]) -> Vec<Connection> {
    let mut sorted = connections.to_vec();
    sorted.sort_by_key(|c| c.order);
    sorted
}
