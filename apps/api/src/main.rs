mod analysis;
mod config;
mod errors;
mod history;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::engine::AnalysisEngine;
use crate::config::{Config, HistoryBackend};
use crate::history::{FileHistoryStore, HistoryStore, MemoryHistoryStore, RedisHistoryStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing backend settings)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Readiness API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_history_store(&config).await?;
    info!(
        "History store initialized (backend: {}, id scheme: {:?})",
        store.backend(),
        config.id_scheme
    );

    let engine = AnalysisEngine::new(store, config.id_scheme);
    let state = AppState {
        engine: Arc::new(engine),
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

/// Constructs the history store selected by `HISTORY_BACKEND`.
async fn build_history_store(config: &Config) -> Result<Arc<dyn HistoryStore>> {
    let store: Arc<dyn HistoryStore> = match &config.history_backend {
        HistoryBackend::Memory => Arc::new(MemoryHistoryStore::new()),
        HistoryBackend::File(path) => {
            info!("Persisting history to {}", path.display());
            Arc::new(FileHistoryStore::new(path.clone()))
        }
        HistoryBackend::Redis(url) => {
            let client = redis::Client::open(url.as_str())?;
            Arc::new(RedisHistoryStore::connect(&client, config.history_key.clone()).await?)
        }
    };
    Ok(store)
}
