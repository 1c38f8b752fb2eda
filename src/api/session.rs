//! Session teardown endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{require_field, ApiError, ApiState};

/// POST /logout request body
#[derive(Deserialize)]
pub struct LogoutRequest {
    identity: Option<String>,
}

/// POST /logout success response
#[derive(Serialize)]
pub struct LogoutResponse {
    success: bool,
    message: String,
}

/// POST /logout
///
/// Drops the identity's credential record. 404 when nothing was stored.
pub async fn logout(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<LogoutRequest>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let identity = require_field(request.identity.as_deref(), "identity")?;

    if state.credentials.end_session(identity).await {
        info!(identity = %identity, "Cleared session");
        Ok(Json(LogoutResponse {
            success: true,
            message: format!("Session cleared for {}", identity),
        }))
    } else {
        Err(ApiError::NotFound(
            "No active session for this identity".to_string(),
        ))
    }
}
