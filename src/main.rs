//! Binary entrypoint: boots the Axum HTTP server, wiring routes, shared
//! state, and middleware.
//!
//! The engine itself is a pure library; this binary is the calling layer.

use portal_feed_engine::api::{create_router, AppState};
use portal_feed_engine::config::{config_path, start_hot_reload_thread, EngineHandle, PortalConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("portal_feed_engine=info,rank=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = PortalConfig::load()?;
    let engine = EngineHandle::new(cfg);

    // If hot reload is enabled, spawn the background watcher.
    start_hot_reload_thread(engine.clone(), config_path());

    let router = create_router(AppState { engine });

    let bind = std::env::var("PORTAL_BIND").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(%bind, "portal feed engine listening");
    axum::serve(listener, router).await?;
    Ok(())
}
