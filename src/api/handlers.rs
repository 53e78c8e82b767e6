use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ApiError, AppState};
use crate::health::HealthResult;
use crate::registry::{validate_connection, Connection, ConnectionId, NewConnection};
use crate::wol::{self, MacAddress};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub connections: usize,
    pub store_synced: bool,
    pub polling: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polling_interval_ms: Option<u64>,
    pub cached_results: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<ConnectionId>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacLookup {
    pub host: String,
    pub mac_address: MacAddress,
}

fn parse_id(raw: &str) -> Result<ConnectionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid connection id '{}'", raw)))
}

fn find(state: &AppState, id: ConnectionId) -> Result<Connection, ApiError> {
    state
        .service
        .connection(id)
        .ok_or_else(|| ApiError::NotFound(format!("Connection not found: {}", id)))
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let service = &state.service;
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        connections: service.registry().len(),
        store_synced: service.registry().is_synced(),
        polling: service.is_polling(),
        polling_interval_ms: service.polling_period().map(|p| p.as_millis() as u64),
        cached_results: service.cache().len(),
    })
}

pub async fn list_connections(State(state): State<AppState>) -> Json<Vec<Connection>> {
    Json(state.service.sorted_view())
}

pub async fn create_connection(
    State(state): State<AppState>,
    Json(payload): Json<NewConnection>,
) -> Result<(StatusCode, Json<Connection>), ApiError> {
    validate_connection(&payload.clone().into_connection(0)).map_err(ApiError::Validation)?;
    let connection = state.service.create_connection(payload).await?;
    Ok((StatusCode::CREATED, Json(connection)))
}

pub async fn update_connection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NewConnection>,
) -> Result<Json<Connection>, ApiError> {
    let existing = find(&state, parse_id(&id)?)?;
    let updated = payload.apply_to(&existing);
    validate_connection(&updated).map_err(ApiError::Validation)?;

    state.service.save_connection(updated.clone()).await?;
    // The store stamps `updatedAt`; answer with what it kept.
    let saved = state.service.connection(updated.id).unwrap_or(updated);
    Ok(Json(saved))
}

pub async fn delete_connection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_connection(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_connections(
    State(state): State<AppState>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Vec<Connection>>, ApiError> {
    state.service.reorder_connections(&request.ids).await?;
    Ok(Json(state.service.sorted_view()))
}

pub async fn wake_connection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.wake(parse_id(&id)?).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Latest result per connection, keyed by id.
pub async fn list_health(State(state): State<AppState>) -> Json<BTreeMap<String, HealthResult>> {
    Json(
        state
            .service
            .health_snapshot()
            .into_iter()
            .map(|(id, result)| (id.to_string(), result))
            .collect(),
    )
}

pub async fn get_health(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HealthResult>, ApiError> {
    let id = parse_id(&id)?;
    state
        .service
        .get_health(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No health result for {}", id)))
}

pub async fn check_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HealthResult>, ApiError> {
    let connection = find(&state, parse_id(&id)?)?;
    Ok(Json(state.service.check_one(&connection).await))
}

pub async fn check_all(State(state): State<AppState>) -> Json<Vec<HealthResult>> {
    Json(state.service.check_registry().await)
}

pub async fn lookup_mac(Path(host): Path<String>) -> Result<Json<MacLookup>, ApiError> {
    let mac_address = wol::lookup_mac(&host).await?;
    Ok(Json(MacLookup { host, mac_address }))
}
