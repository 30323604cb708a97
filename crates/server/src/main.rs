// crates/server/src/main.rs
//! Focus-guard server binary.
//!
//! Opens the SQLite store, seeds the demo students and serves the HTTP API
//! plus the realtime WebSocket until interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use focus_guard_db::Database;
use focus_guard_server::{create_app, AppState, ServerConfig, WebhookNotifier};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,focus_guard_server=info,focus_guard_db=info".into()),
        )
        .init();

    // reqwest and tokio-tungstenite share one rustls provider.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let config = ServerConfig::parse();

    let db = match &config.db_path {
        Some(path) => Database::new(path).await,
        None => Database::open_default().await,
    }
    .context("failed to open database")?;
    info!(path = %db.db_path().display(), "Database ready");

    if config.no_seed {
        info!("Skipping demo student seed");
    } else {
        db.seed_default_students()
            .await
            .context("failed to seed students")?;
    }

    let notifier = WebhookNotifier::new(config.webhook_url.clone(), config.webhook_timeout())
        .context("failed to build webhook client")?;
    if !notifier.is_configured() {
        warn!("N8N_WEBHOOK_URL is not set; mentor notifications are disabled");
    }

    let state = AppState::new(db, Arc::new(notifier));
    let app = create_app(state, &config.cors_origins());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
