mod config;
mod db;
mod error;
mod handlers;
mod models;
mod secret;
mod services;
mod storage;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::storage::StorageProvider;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub storage: Arc<dyn StorageProvider>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting filer...");

    // Configuration is read once; missing required values abort startup.
    let config = Config::load()?;
    tracing::info!("Configuration loaded");

    let db = Database::new(&config.record_store.url, &config.record_store.table).await?;
    db.run_migrations().await?;
    tracing::info!("Record store initialized");

    let storage = storage::from_config(&config.storage);
    tracing::info!("Storage backend: {}", storage.storage_type());

    let state = AppState { db, storage };
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/HttpExample", get(handlers::greeting::hello))
        .route("/api/HttpTrigger", get(handlers::greeting::hello))
        .route("/api/UploadTrigger", post(handlers::transfer::upload))
        .route("/api/DownloadTrigger", get(handlers::transfer::download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
