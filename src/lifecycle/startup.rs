//! Startup orchestration.

use std::sync::Arc;

use crate::config::MonitorConfig;
use crate::monitor::{BuildError, MonitorService};

/// Build the service, load connections and start polling when enabled.
///
/// An unreachable store only leaves the registry empty; construction
/// failures are fatal.
pub async fn bootstrap(config: &MonitorConfig) -> Result<Arc<MonitorService>, BuildError> {
    let service = Arc::new(MonitorService::from_config(config)?);

    if service.load().await {
        tracing::info!(connections = service.registry().len(), "Connections loaded");
    } else {
        tracing::warn!("Starting with an empty connection list");
    }

    if config.polling.enabled {
        service.poll_registry(config.polling.interval());
    } else {
        tracing::info!("Health polling disabled by configuration");
    }

    Ok(service)
}
