//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use vendora_core::Config;

use crate::state::AppState;

/// Initialize the entire application: telemetry, catalog store, upload directories, routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(&config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let store = database::setup_store(&config).await?;
    build_app(config, store).await
}

/// Build state and router around an existing catalog store.
pub async fn build_app(
    config: Config,
    store: Arc<dyn vendora_db::CatalogStore>,
) -> Result<(Arc<AppState>, axum::Router)> {
    for dir in [config.product_image_dir(), config.staging_dir()] {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;
    }

    let state = Arc::new(AppState::new(config.clone(), store));
    let router = routes::setup_routes(&config, state.clone())?;
    Ok((state, router))
}
