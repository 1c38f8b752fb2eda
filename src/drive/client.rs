use anyhow::{anyhow, Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::DriveConfig;

/// Metadata part sent alongside the file bytes on creation.
#[derive(Debug, Serialize)]
struct FileMetadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parents: Option<Vec<&'a str>>,
}

/// Created-file response; only the id matters here.
#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

/// Fixed "anyone with the link can read" grant.
#[derive(Debug, Serialize)]
struct PermissionGrant<'a> {
    role: &'a str,
    #[serde(rename = "type")]
    grantee_type: &'a str,
}

/// Shareable link fields; Drive may omit either depending on file type.
#[derive(Debug, Deserialize)]
pub struct ShareLinks {
    #[serde(rename = "webViewLink")]
    pub web_view_link: Option<String>,
    #[serde(rename = "webContentLink")]
    pub web_content_link: Option<String>,
}

/// Error envelope Drive returns on failed calls.
#[derive(Debug, Default, Deserialize)]
struct DriveErrorBody {
    error: Option<DriveErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct DriveErrorDetail {
    message: Option<String>,
}

/// HTTP client for the Google Drive v3 API.
///
/// Holds no per-user state: the bearer token is supplied per call, since
/// one process serves many identities. Upload traffic and metadata traffic
/// go to different hosts, hence the two base URLs.
pub struct DriveClient {
    http_client: Client,
    api_base_url: String,
    upload_base_url: String,
}

impl DriveClient {
    /// Create a client from configuration, with the configured per-request
    /// timeout applied to every outbound call.
    pub fn new(config: &DriveConfig) -> Self {
        let http_client = Client::builder()
            .user_agent("ferry/0.1")
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http_client,
            api_base_url: config.api_base_url.clone(),
            upload_base_url: config.upload_base_url.clone(),
        }
    }

    /// Create a client with custom base URLs (for testing with a mock server).
    pub fn with_base_urls(api_base_url: String, upload_base_url: String) -> Self {
        let http_client = Client::builder()
            .user_agent("ferry/0.1")
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http_client,
            api_base_url,
            upload_base_url,
        }
    }

    /// Create a file from raw bytes, optionally inside a parent folder.
    /// Returns the id Drive assigned to the new file.
    ///
    /// On a non-success status the provider's `error.message` is surfaced
    /// when the body carries one, else a generic message.
    pub async fn create_file(
        &self,
        access_token: &str,
        name: &str,
        content: Vec<u8>,
        folder_id: Option<&str>,
    ) -> Result<String> {
        let metadata = FileMetadata {
            name,
            parents: folder_id.map(|id| vec![id]),
        };
        let metadata_json =
            serde_json::to_string(&metadata).context("Failed to encode file metadata")?;

        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata_json)
                    .mime_str("application/json")
                    .context("Failed to build metadata part")?,
            )
            .part(
                "file",
                Part::bytes(content)
                    .file_name(name.to_string())
                    .mime_str("application/octet-stream")
                    .context("Failed to build file part")?,
            );

        let url = format!("{}/files?uploadType=multipart", self.upload_base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .multipart(form)
            .send()
            .await
            .context("Failed to send file creation request")?;

        let status = response.status();
        if !status.is_success() {
            let body: DriveErrorBody = response.json().await.unwrap_or_default();
            let message = body
                .error
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| "Upload failed.".to_string());
            warn!(status = %status, "Drive rejected file creation: {}", message);
            return Err(anyhow!(message));
        }

        let created: CreatedFile = response
            .json()
            .await
            .context("Failed to parse file creation response")?;
        Ok(created.id)
    }

    /// Grant "anyone with the link can read" on a file.
    pub async fn grant_public_access(&self, access_token: &str, file_id: &str) -> Result<()> {
        let url = format!("{}/files/{}/permissions", self.api_base_url, file_id);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(&PermissionGrant {
                role: "reader",
                grantee_type: "anyone",
            })
            .send()
            .await
            .context("Failed to send permission request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Permission grant failed with status {}", status));
        }
        Ok(())
    }

    /// Fetch the view and download links for a file.
    pub async fn fetch_share_links(&self, access_token: &str, file_id: &str) -> Result<ShareLinks> {
        let url = format!(
            "{}/files/{}?fields=webViewLink,webContentLink",
            self.api_base_url, file_id
        );
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to send link fetch request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Link fetch failed with status {}", status));
        }
        response
            .json::<ShareLinks>()
            .await
            .context("Failed to parse link fetch response")
    }
}
