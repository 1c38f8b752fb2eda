//! Authorization endpoints: consent URL issuance and token submission.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{require_field, ApiError, ApiState};
use crate::credentials::SaveError;
use crate::drive;

/// POST /auth request body
#[derive(Deserialize)]
pub struct AuthRequest {
    #[serde(rename = "clientId")]
    client_id: Option<String>,
    identity: Option<String>,
    #[serde(rename = "redirectUri")]
    redirect_uri: Option<String>,
}

/// POST /auth success response
#[derive(Serialize)]
pub struct AuthResponse {
    success: bool,
    #[serde(rename = "authUrl")]
    auth_url: String,
    message: String,
}

/// POST /token request body. The token arrives under either name;
/// observed clients disagree on what to call it.
#[derive(Deserialize)]
pub struct TokenRequest {
    identity: Option<String>,
    #[serde(rename = "bearerToken", alias = "accessToken")]
    bearer_token: Option<String>,
}

/// POST /token success response
#[derive(Serialize)]
pub struct TokenResponse {
    success: bool,
    message: String,
    #[serde(rename = "expiresInMinutes")]
    expires_in_minutes: i64,
}

/// POST /auth
///
/// Validates the request, registers a transitional record for the
/// identity, and returns the consent URL to open in a browser.
pub async fn begin_auth(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let client_id = require_field(request.client_id.as_deref(), "clientId")?;
    let identity = require_field(request.identity.as_deref(), "identity")?;
    let redirect_uri = request
        .redirect_uri
        .as_deref()
        .filter(|uri| !uri.is_empty())
        .unwrap_or(drive::DEFAULT_REDIRECT_URI);

    state
        .credentials
        .begin_authorization(identity, client_id)
        .await;
    let auth_url = drive::build_consent_url(client_id, redirect_uri, identity);
    info!(identity = %identity, "Issued authorization URL");

    Ok(Json(AuthResponse {
        success: true,
        auth_url,
        message: "Open authUrl in a browser to grant access, then submit the token via POST /token"
            .to_string(),
    }))
}

/// POST /token
///
/// Attaches the bearer token obtained from the consent flow to the
/// identity's record. Requires a prior POST /auth for the identity.
pub async fn save_token(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let identity = require_field(request.identity.as_deref(), "identity")?;
    let bearer_token = require_field(request.bearer_token.as_deref(), "bearerToken")?;

    match state
        .credentials
        .save_credential(identity, bearer_token)
        .await
    {
        Ok(()) => {
            info!(identity = %identity, "Stored access token");
            Ok(Json(TokenResponse {
                success: true,
                message: format!("Access token saved for {}", identity),
                expires_in_minutes: state.ttl_minutes,
            }))
        }
        Err(SaveError::NotInitiated) => Err(ApiError::BadRequest(
            "No authorization initiated for this identity. Call /auth first".to_string(),
        )),
    }
}
