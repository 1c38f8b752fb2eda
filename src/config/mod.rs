use anyhow::{Context, Result};
use serde::Deserialize;

/// Complete Ferry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FerryConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub drive: DriveConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Port to bind; the PORT env var takes precedence at startup
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted upload request body (bytes)
    #[serde(default = "default_upload_size_limit")]
    pub upload_size_limit_bytes: usize,
}

fn default_port() -> u16 {
    3000
}

fn default_upload_size_limit() -> usize {
    10_485_760 // 10 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            upload_size_limit_bytes: default_upload_size_limit(),
        }
    }
}

/// Credential session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// How long a saved credential stays usable (minutes)
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,
    /// How often the background sweep drops expired records (seconds)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

fn default_ttl_minutes() -> i64 {
    45
}

fn default_sweep_interval() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl_minutes(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

/// Drive API endpoints and client behavior
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,
    /// Per-request timeout on the outbound HTTP client (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_upload_base_url() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            upload_base_url: default_upload_base_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for FerryConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            sessions: SessionConfig::default(),
            drive: DriveConfig::default(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<FerryConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path))?;
    let config: FerryConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path))?;
    Ok(config)
}
