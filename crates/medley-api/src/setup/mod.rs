//! Application setup and initialization
//!
//! All application initialization logic lives here rather than in main.rs.

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use medley_core::Config;
use medley_db::{MediaRepository, TagRepository, UserRepository};
use medley_storage::{LocalStorage, Storage};

use crate::auth::jwt::JwtService;
use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();
    tracing::info!("Configuration loaded and validated successfully");

    // Setup database
    let pool = database::setup_database(&config).await?;

    // Setup storage
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(
            config.storage_path.clone(),
            config.storage_base_url.clone(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?,
    );

    let jwt = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_expiry_hours));

    let state = Arc::new(AppState {
        config: config.clone(),
        pool: pool.clone(),
        users: UserRepository::new(pool.clone()),
        tags: TagRepository::new(pool.clone()),
        media: MediaRepository::new(pool),
        storage,
        jwt,
    });

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
