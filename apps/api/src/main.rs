mod config;
mod edit;
mod errors;
mod ingest;
mod models;
mod render;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::ingest::client::HttpExtractionClient;
use crate::routes::build_router;
use crate::session::{spawn_idle_sweeper, SessionStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    let extraction = HttpExtractionClient::new(&config.extraction_service_url)?;
    info!(
        "Extraction client initialized ({})",
        config.extraction_service_url
    );

    let sessions = SessionStore::new();
    spawn_idle_sweeper(sessions.clone(), config.session_idle_minutes);
    info!(
        "Session store ready (idle timeout {} min)",
        config.session_idle_minutes
    );

    let state = AppState {
        config: config.clone(),
        sessions,
        extraction: Arc::new(extraction),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
