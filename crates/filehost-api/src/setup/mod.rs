//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use filehost_core::{FilehostConfig, SharedConfig};

/// Initialize the entire application
pub async fn initialize_app(config: FilehostConfig) -> Result<(AppState, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    storage::setup_storage(&config).await?;

    let router_config = config.clone();
    let state = AppState::new(SharedConfig::new(config));
    let router = routes::setup_routes(&router_config, state.clone());

    Ok((state, router))
}
