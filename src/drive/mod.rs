//! Google Drive integration.
//!
//! Two halves: the consent URL callers open in a browser to grant access
//! (OAuth implicit flow), and the upload sequence run against the Drive
//! v3 API once a bearer token is on file. The sequence is create file,
//! then for public uploads grant link access and fetch the share links.

mod client;

pub use client::{DriveClient, ShareLinks};

use anyhow::Result;
use tracing::{info, warn};

/// Consent endpoint for the OAuth implicit grant.
pub const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Redirect target used when the caller does not supply one. The
/// playground displays the granted token so it can be copied into /token.
pub const DEFAULT_REDIRECT_URI: &str = "https://developers.google.com/oauthplayground";

/// Scopes requested on every authorization: per-file Drive access plus
/// openid/email so the consent screen shows which account is granting.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.file",
    "openid",
    "email",
];

/// Build the consent URL a caller opens to authorize this service.
/// `login_hint` preselects the granting account in the provider's chooser.
pub fn build_consent_url(client_id: &str, redirect_uri: &str, login_hint: &str) -> String {
    format!(
        "{}?client_id={}&response_type=token&scope={}&redirect_uri={}&login_hint={}",
        AUTH_ENDPOINT,
        urlencoding::encode(client_id),
        urlencoding::encode(&SCOPES.join(" ")),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(login_hint),
    )
}

/// One upload flowing through the three-step sequence.
#[derive(Debug)]
pub struct UploadRequest {
    pub file_name: String,
    pub content: Vec<u8>,
    pub folder_id: Option<String>,
    /// Whether the caller asked for anyone-with-the-link visibility
    pub public: bool,
}

/// What the sequence produced. `file_id` is authoritative; the links are
/// best-effort and only attempted for public uploads.
#[derive(Debug)]
pub struct UploadOutcome {
    pub file_id: String,
    pub view_url: Option<String>,
    pub download_url: Option<String>,
}

/// Run the upload sequence against Drive.
///
/// Only file creation can fail the transaction. Once the file exists,
/// sharing problems downgrade the outcome to links-absent rather than
/// failing an upload that already happened; the caller still gets the id.
pub async fn upload_and_share(
    client: &DriveClient,
    access_token: &str,
    request: UploadRequest,
) -> Result<UploadOutcome> {
    let UploadRequest {
        file_name,
        content,
        folder_id,
        public,
    } = request;

    let file_id = client
        .create_file(access_token, &file_name, content, folder_id.as_deref())
        .await?;
    info!(file_id = %file_id, file_name = %file_name, "Created Drive file");

    let mut view_url = None;
    let mut download_url = None;

    if public {
        if let Err(e) = client.grant_public_access(access_token, &file_id).await {
            warn!(file_id = %file_id, "Failed to grant public access: {}", e);
        }
        match client.fetch_share_links(access_token, &file_id).await {
            Ok(links) => {
                view_url = links.web_view_link;
                download_url = links.web_content_link;
            }
            Err(e) => {
                warn!(file_id = %file_id, "Failed to fetch share links: {}", e);
            }
        }
    }

    Ok(UploadOutcome {
        file_id,
        view_url,
        download_url,
    })
}
