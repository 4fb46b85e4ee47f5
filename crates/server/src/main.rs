// crates/server/src/main.rs
//! OpenClaw dashboard server binary.
//!
//! Parses configuration, wires the aggregator and change notifier into the
//! Axum app and serves until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use openclaw_dash_core::{Aggregator, StateLayout};
use openclaw_dash_server::notifier::{NotifierHub, NotifyBackend};
use openclaw_dash_server::{create_app, AppState, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();

    let config = ServerConfig::parse();

    let root = config
        .state_root()
        .context("Could not determine home directory; pass --root or set OPENCLAW_DIR")?;
    if !root.is_dir() {
        tracing::warn!(root = %root.display(), "State directory does not exist; views will be empty");
    }

    let aggregator = Arc::new(Aggregator::new(StateLayout::new(&root)));
    let backend = NotifyBackend::new(aggregator.clone(), config.watch_agents());
    let notifier = NotifierHub::new(Arc::new(backend));
    let auth_token = config.auth_token();
    let auth_enabled = auth_token.is_some();
    let state = AppState::new(aggregator, notifier, auth_token, config.keepalive());

    let static_dir = config.static_dir();
    let app = create_app(state, static_dir.clone());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        %addr,
        root = %root.display(),
        auth = auth_enabled,
        static_dir = ?static_dir,
        "openclaw-dash v{} listening",
        env!("CARGO_PKG_VERSION")
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
