//! Error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::monitor::WakeError;
use crate::registry::{ConnectionValidationError, RegistryError, StoreError};
use crate::wol::WolError;

/// Failure of an API call, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Validation(Vec<ConnectionValidationError>),
    Registry(RegistryError),
    Wake(WolError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Registry(e) => match e.store_error() {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Wake(e) => match e {
                WolError::InvalidMacAddress | WolError::InvalidBroadcast(_) => StatusCode::BAD_REQUEST,
                WolError::NotSsh | WolError::NotEnabled | WolError::NoMacAddress => StatusCode::UNPROCESSABLE_ENTITY,
                WolError::MacNotFound => StatusCode::NOT_FOUND,
                WolError::Send(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        ApiError::Registry(e)
    }
}

impl From<WolError> for ApiError {
    fn from(e: WolError) -> Self {
        ApiError::Wake(e)
    }
}

impl From<WakeError> for ApiError {
    fn from(e: WakeError) -> Self {
        match e {
            WakeError::NotFound(id) => ApiError::NotFound(format!("Connection not found: {}", id)),
            WakeError::Wol(e) => ApiError::Wake(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => json!({ "error": msg }),
            ApiError::Validation(errors) => json!({
                "error": "Invalid connection",
                "details": errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            }),
            ApiError::Registry(e) => json!({ "error": e.to_string() }),
            ApiError::Wake(e) => json!({ "error": e.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
