//! Persistence contract for connection records.

use async_trait::async_trait;
use thiserror::Error;

use crate::registry::types::{Connection, ConnectionId};

/// Errors raised by a connection store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection not found: {0}")]
    NotFound(ConnectionId),

    #[error("Failed to determine config directory")]
    NoDataDir,

    /// The backing service could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Authoritative storage of connection records.
///
/// The registry never patches its in-memory view; it reloads from this
/// store after every mutation.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Return every stored connection.
    async fn list(&self) -> StoreResult<Vec<Connection>>;

    /// Insert or replace the connection with the same identifier.
    async fn persist(&self, connection: Connection) -> StoreResult<()>;

    /// Remove a connection. Fails with [`StoreError::NotFound`] for unknown ids.
    async fn delete(&self, id: ConnectionId) -> StoreResult<()>;

    /// Apply a target ordering. Handling of omitted or duplicated ids is up
    /// to the implementation.
    async fn reorder(&self, ids: &[ConnectionId]) -> StoreResult<()>;
}
