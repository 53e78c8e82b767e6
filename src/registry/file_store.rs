//! JSON file backed connection store.
//!
//! # Responsibilities
//! - Keep all connections in a single pretty-printed JSON array
//! - Survive partially corrupt files by quarantining bad records
//! - Serialize read-modify-write cycles within the process
//!
//! # Design Decisions
//! - Missing file means "no connections yet", not an error
//! - Writes go to a temp file and are renamed into place
//! - Quarantined records are removed from the main file
//! - Reorder assigns `order = index`; ids not in the file are ignored

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::registry::store::{ConnectionStore, StoreError, StoreResult};
use crate::registry::types::{Connection, ConnectionId};

const FILE_NAME: &str = "connections.json";

/// Connection store persisting to a JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store backed by the given file. The file is created lazily.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store in the platform config directory.
    pub fn in_default_dir() -> StoreResult<Self> {
        let dirs = directories::ProjectDirs::from("com", "endpoint-watch", "endpoint-watch")
            .ok_or(StoreError::NoDataDir)?;
        Ok(Self::new(dirs.config_dir().join(FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> StoreResult<Vec<Connection>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        if let Ok(connections) = serde_json::from_str::<Vec<Connection>>(&contents) {
            return Ok(connections);
        }

        // Salvage what we can record by record.
        let values: Vec<serde_json::Value> = serde_json::from_str(&contents)?;
        let mut connections = Vec::with_capacity(values.len());
        let mut invalid = Vec::new();
        for value in values {
            match serde_json::from_value::<Connection>(value.clone()) {
                Ok(connection) => connections.push(connection),
                Err(_) => invalid.push(value),
            }
        }

        if !invalid.is_empty() {
            self.quarantine(&invalid).await;
            self.write_all(&connections).await?;
        }

        Ok(connections)
    }

    async fn quarantine(&self, invalid: &[serde_json::Value]) {
        let backup = self.path.with_file_name(format!(
            "connections.invalid-{}.json",
            Utc::now().format("%Y%m%d%H%M%S")
        ));

        let written = match serde_json::to_string_pretty(invalid) {
            Ok(contents) => fs::write(&backup, contents).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match written {
            Ok(()) => tracing::warn!(
                count = invalid.len(),
                backup = %backup.display(),
                "Quarantined invalid connection records"
            ),
            Err(error) => tracing::error!(
                count = invalid.len(),
                error = %error,
                "Failed to quarantine invalid connection records"
            ),
        }
    }

    async fn write_all(&self, connections: &[Connection]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let contents = serde_json::to_string_pretty(connections)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ConnectionStore for JsonFileStore {
    async fn list(&self) -> StoreResult<Vec<Connection>> {
        let _guard = self.write_lock.lock().await;
        self.read_all().await
    }

    async fn persist(&self, mut connection: Connection) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut connections = self.read_all().await?;

        connection.updated_at = Utc::now();
        match connections.iter_mut().find(|c| c.id == connection.id) {
            Some(existing) => {
                connection.created_at = existing.created_at;
                *existing = connection;
            }
            None => connections.push(connection),
        }

        self.write_all(&connections).await
    }

    async fn delete(&self, id: ConnectionId) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut connections = self.read_all().await?;

        let before = connections.len();
        connections.retain(|c| c.id != id);
        if connections.len() == before {
            return Err(StoreError::NotFound(id));
        }

        self.write_all(&connections).await
    }

    async fn reorder(&self, ids: &[ConnectionId]) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut connections = self.read_all().await?;

        for (index, id) in ids.iter().enumerate() {
            if let Some(connection) = connections.iter_mut().find(|c| c.id == *id) {
                connection.order = index as i32;
            }
        }

        self.write_all(&connections).await
    }
}
