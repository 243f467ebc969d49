//! Route configuration and setup

use crate::handlers::{dispatch::dispatch, health::health_check};
use crate::middleware::security_headers::{security_headers_middleware, SecurityHeadersConfig};
use crate::state::AppState;
use axum::{routing::get, Router};
use filehost_core::FilehostConfig;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub const HEALTH_PATH: &str = "/health";

/// Setup all application routes
///
/// Upload and retrieval live behind the fallback because their mount path can
/// change on reload.
pub fn setup_routes(config: &FilehostConfig, state: AppState) -> Router<()> {
    let security_headers = Arc::new(SecurityHeadersConfig::new(config.is_production()));

    Router::new()
        .route(HEALTH_PATH, get(health_check))
        .fallback(dispatch)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn_with_state(
                    security_headers,
                    security_headers_middleware,
                )),
        )
        .with_state(state)
}
