//! File upload endpoint: resolves the caller's credential and runs the
//! Drive upload sequence.

use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::ApiState;
use crate::drive::{self, UploadRequest};

/// POST /upload success response
#[derive(Serialize)]
pub struct UploadResponse {
    success: bool,
    #[serde(rename = "fileId")]
    file_id: String,
    #[serde(rename = "viewUrl", skip_serializing_if = "Option::is_none")]
    view_url: Option<String>,
    #[serde(rename = "downloadUrl", skip_serializing_if = "Option::is_none")]
    download_url: Option<String>,
    visibility: String,
}

/// Upload errors carry the success flag alongside the message, unlike the
/// other endpoints.
#[derive(Serialize)]
struct UploadErrorResponse {
    success: bool,
    error: String,
}

/// Error types for the upload endpoint
#[derive(Debug)]
pub enum UploadError {
    BadRequest(String),
    Unauthorized(String),
    PayloadTooLarge,
    Failed(String),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            UploadError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            UploadError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            UploadError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload too large".to_string())
            }
            UploadError::Failed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(UploadErrorResponse {
            success: false,
            error: error_message,
        });

        (status, body).into_response()
    }
}

/// Fields decoded from the multipart body.
#[derive(Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    identity: Option<String>,
    folder_id: Option<String>,
    public: bool,
}

/// Form encoders stringify booleans, so the public flag arrives as text.
/// Only the literal "true" selects the public path.
fn is_public_flag(value: &str) -> bool {
    value == "true"
}

/// Reads that trip the body size limit map to 413; any other multipart
/// failure is a malformed body (400).
fn multipart_error(e: MultipartError, context: &str) -> UploadError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::PayloadTooLarge
    } else {
        UploadError::BadRequest(format!("{}: {}", context, e))
    }
}

async fn read_text(field: Field<'_>) -> Result<String, UploadError> {
    field
        .text()
        .await
        .map_err(|e| multipart_error(e, "Malformed multipart field"))
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, UploadError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Malformed multipart body"))?
    {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("upload-{}", Uuid::new_v4()));
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, "Failed to read file"))?;
                form.file = Some((file_name, bytes.to_vec()));
            }
            "identity" => form.identity = Some(read_text(field).await?),
            "folderId" => form.folder_id = Some(read_text(field).await?),
            "isPublic" => form.public = is_public_flag(&read_text(field).await?),
            _ => {}
        }
    }

    Ok(form)
}

/// POST /upload
///
/// Multipart body: `file` (required), `identity` (required), `folderId`
/// and `isPublic` optional. Requires an active credential for the
/// identity; link fields come back only on the public path.
pub async fn upload_file(
    State(state): State<Arc<ApiState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let form = read_upload_form(multipart).await?;

    let (file_name, content) = form
        .file
        .ok_or_else(|| UploadError::BadRequest("No file uploaded".to_string()))?;
    if content.is_empty() {
        return Err(UploadError::BadRequest(
            "Uploaded file is empty".to_string(),
        ));
    }
    let identity = match form.identity.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Err(UploadError::BadRequest(
                "Missing required field: identity".to_string(),
            ))
        }
    };

    let credential = match state.credentials.resolve_credential(identity).await {
        Some(credential) => credential,
        None => {
            return Err(UploadError::Unauthorized(
                "No valid session for this identity. Authorize via /auth and /token first"
                    .to_string(),
            ))
        }
    };

    info!(
        identity = %identity,
        file_name = %file_name,
        size = content.len(),
        public = form.public,
        "Upload requested"
    );

    let request = UploadRequest {
        file_name,
        content,
        folder_id: form.folder_id,
        public: form.public,
    };
    let outcome = drive::upload_and_share(&state.drive, &credential.access_token, request)
        .await
        .map_err(|e| {
            warn!(identity = %identity, "Upload failed: {:#}", e);
            UploadError::Failed(e.to_string())
        })?;

    let visibility = if form.public { "public" } else { "private" };
    Ok(Json(UploadResponse {
        success: true,
        file_id: outcome.file_id,
        view_url: outcome.view_url,
        download_url: outcome.download_url,
        visibility: visibility.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_public_flag() {
        assert!(is_public_flag("true"));
        assert!(!is_public_flag("false"));
        assert!(!is_public_flag("TRUE"));
        assert!(!is_public_flag("1"));
        assert!(!is_public_flag(""));
    }
}
