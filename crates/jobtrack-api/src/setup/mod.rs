//! Application setup and initialization
//!
//! All application initialization logic lives here, extracted from main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;
pub mod telemetry;

use crate::state::AppState;
use anyhow::{Context, Result};
use jobtrack_core::Config;
use jobtrack_storage::{create_storage, RecordStore, TransferBroker};
use std::sync::Arc;
use std::time::Duration;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration before touching the network.
    config.validate().context("Configuration validation failed")?;

    let storage = create_storage(&config)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(
        backend = %storage.backend_type(),
        "Storage backend initialized"
    );

    let store = RecordStore::new(storage.clone());
    let broker = TransferBroker::new(
        storage,
        Duration::from_secs(config.presigned_url_expiry_secs),
    );

    let state = Arc::new(AppState {
        config,
        store,
        broker,
    });

    let router = routes::build_router(state.clone());

    Ok((state, router))
}
