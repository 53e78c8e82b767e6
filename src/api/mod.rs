//! Management API.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → TraceLayer → TimeoutLayer
//!     → auth.rs (bearer API key)
//!     → handlers.rs
//!         → MonitorService
//!     → error.rs (JSON error bodies)
//! ```
//!
//! # Design Decisions
//! - Every route requires the API key
//! - Payloads are validated here, before they reach the store
//! - Identifiers in paths are parsed by hand so errors stay JSON

pub mod auth;
pub mod error;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::monitor::MonitorService;
use self::auth::require_api_key;
use self::handlers::*;

pub use self::error::ApiError;

/// State shared with every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MonitorService>,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn new(service: Arc<MonitorService>, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            service,
            api_key: api_key.into(),
        }
    }
}

#[allow(deprecated)]
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/connections", get(list_connections).post(create_connection))
        .route("/api/connections/reorder", post(reorder_connections))
        .route("/api/connections/{id}", put(update_connection).delete(delete_connection))
        .route("/api/connections/{id}/wake", post(wake_connection))
        .route("/api/health", get(list_health))
        .route("/api/health/check", post(check_all))
        .route("/api/health/{id}", get(get_health))
        .route("/api/health/{id}/check", post(check_one))
        .route("/api/mac/{host}", get(lookup_mac))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    request_timeout: Duration,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Management API listening");

    axum::serve(listener, router(state, request_timeout))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Management API stopped");
    Ok(())
}
