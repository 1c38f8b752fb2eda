// HTTP API (auth, token, upload, logout, health)
pub mod api;

// Configuration loading
pub mod config;

// Credential store (identity -> bearer token, TTL-bounded)
pub mod credentials;

// Google Drive client and upload orchestration
pub mod drive;
