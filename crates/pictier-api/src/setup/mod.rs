//! Application setup and initialization
//!
//! Everything `main` needs to go from a [`Config`] to a running router, split
//! out so tests can build the same router around in-memory repositories.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use anyhow::{Context, Result};
use pictier_core::Config;
use pictier_db::{PgPhotoCatalog, PgTierRegistry, PgUserDirectory};

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(&config.environment)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(config = ?config, "Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let state = AppState::new(
        config.clone(),
        Arc::new(PgTierRegistry::new(pool.clone())),
        Arc::new(PgPhotoCatalog::new(pool.clone())),
        Arc::new(PgUserDirectory::new(pool)),
        storage,
    )
    .context("Failed to build application state")?;
    let state = Arc::new(state);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
