use anyhow::{Context, Result};
use chrono::Duration;
use ferry::api::{create_router, ApiState};
use ferry::config::{load_config, FerryConfig};
use ferry::credentials::{run_session_sweep, CredentialStore, MemoryCredentialStore};
use ferry::drive::DriveClient;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ferry=info".into()),
        )
        .init();

    info!("Ferry starting...");

    // Read configuration (FERRY_CONFIG names a TOML file; defaults otherwise)
    let config = match std::env::var("FERRY_CONFIG") {
        Ok(path) => load_config(&path)?,
        Err(_) => FerryConfig::default(),
    };

    // PORT from the environment wins over the config file
    let port: u16 = match std::env::var("PORT") {
        Ok(value) => value.parse().context("PORT must be a valid port number")?,
        Err(_) => config.server.port,
    };

    info!(
        port = port,
        ttl_minutes = config.sessions.ttl_minutes,
        "Configuration loaded"
    );

    // Initialize the credential store and start the expiry sweep
    let credentials: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new(
        Duration::minutes(config.sessions.ttl_minutes),
    ));
    tokio::spawn(run_session_sweep(
        Arc::clone(&credentials),
        config.sessions.sweep_interval_seconds,
    ));

    // Initialize the Drive client
    let drive = Arc::new(DriveClient::new(&config.drive));

    // Start the HTTP API server
    let state = ApiState {
        credentials,
        drive,
        ttl_minutes: config.sessions.ttl_minutes,
        upload_size_limit_bytes: config.server.upload_size_limit_bytes,
    };
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .context("Failed to bind API port")?;
    info!(port = port, "Ferry API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();

    Ok(())
}
