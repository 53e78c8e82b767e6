//! Latest-result cache keyed by connection.

use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::health::types::HealthResult;
use crate::observability::metrics;
use crate::registry::ConnectionId;

/// A thread-safe map of connection id to its most recent health result.
///
/// Cloning is cheap and shares the same map. Each entry is replaced as a
/// whole, so readers see either the old or the new result, never a mix.
#[derive(Clone, Default)]
pub struct HealthCache {
    inner: Arc<DashMap<ConnectionId, HealthResult>>,
}

impl HealthCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest result for a connection, if it was ever checked.
    pub fn get(&self, id: &ConnectionId) -> Option<HealthResult> {
        self.inner.get(id).map(|r| r.value().clone())
    }

    /// Overwrite the result for a connection. Last write wins.
    pub fn set(&self, id: ConnectionId, result: HealthResult) {
        self.inner.insert(id, result);
        metrics::record_cache_size(self.inner.len());
    }

    /// Copy of every entry at the time of the call.
    pub fn snapshot(&self) -> HashMap<ConnectionId, HealthResult> {
        self.inner
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect()
    }

    /// Drop entries whose connection is not in `live`. Returns how many
    /// entries were removed.
    pub fn retain_ids(&self, live: &HashSet<ConnectionId>) -> usize {
        let before = self.inner.len();
        self.inner.retain(|id, _| live.contains(id));
        let removed = before.saturating_sub(self.inner.len());
        if removed > 0 {
            tracing::debug!(removed, "Swept orphaned health results");
            metrics::record_cache_size(self.inner.len());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
