// HTTP API (REST, consumed by a browser widget)

mod auth;
mod session;
mod upload;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::credentials::CredentialStore;
use crate::drive::DriveClient;

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error types shared by the auth and session endpoints
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

/// Shared application state for all API handlers
#[derive(Clone)]
pub struct ApiState {
    pub credentials: Arc<dyn CredentialStore>,
    pub drive: Arc<DriveClient>,
    /// TTL reported to callers as expiresInMinutes
    pub ttl_minutes: i64,
    /// Largest accepted request body; oversized uploads get a 413
    pub upload_size_limit_bytes: usize,
}

/// Extract a required, non-empty string field from a request body.
fn require_field<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!(
            "Missing required field: {}",
            name
        ))),
    }
}

/// Create the API router
pub fn create_router(state: ApiState) -> Router {
    // axum caps request bodies at 2 MB unless overridden
    let body_limit = state.upload_size_limit_bytes;
    Router::new()
        .route("/auth", post(auth::begin_auth))
        .route("/token", post(auth::save_token))
        .route("/upload", post(upload::upload_file))
        .route("/logout", post(session::logout))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "ferry"
    }))
}
