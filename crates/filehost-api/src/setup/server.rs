//! Server startup, configuration reload and graceful shutdown

use anyhow::Result;
use axum::Router;
use filehost_core::{FilehostConfig, SharedConfig};

use crate::setup::{storage, validation};

/// Start the server with graceful shutdown
pub async fn start_server(config: SharedConfig, app: Router) -> Result<()> {
    let snapshot = config.snapshot();
    let addr = format!("0.0.0.0:{}", snapshot.server_port);
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        public_url = %snapshot.public_url(),
        max_upload_mb = snapshot.max_upload_bytes / 1024 / 1024,
        authenticate = snapshot.authenticate,
        require_ssl = snapshot.require_ssl,
        "Server ready and accepting connections"
    );

    #[cfg(unix)]
    let reload_task = tokio::spawn(reload_on_hangup(config.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    #[cfg(unix)]
    reload_task.abort();

    Ok(())
}

/// Re-read `.env` and the environment and swap the result in.
///
/// The listener port is fixed for the life of the process; a changed port is
/// ignored with a warning. On any error the running configuration stays.
pub async fn reload(config: &SharedConfig) -> Result<()> {
    let current = config.snapshot();
    let next = FilehostConfig::reload_env()?;
    apply_reload(config, &current, next).await
}

async fn apply_reload(
    config: &SharedConfig,
    current: &FilehostConfig,
    next: FilehostConfig,
) -> Result<()> {
    validation::validate_config(&next)?;
    if next.server_port != current.server_port {
        tracing::warn!(
            current = current.server_port,
            requested = next.server_port,
            "PORT changes need a restart, keeping the current listener"
        );
    }
    if next.storage_path != current.storage_path {
        storage::setup_storage(&next).await?;
    }
    let public_url = next.public_url();
    config.replace(next)?;
    tracing::info!(public_url = %public_url, "Configuration reloaded");
    Ok(())
}

#[cfg(unix)]
async fn reload_on_hangup(config: SharedConfig) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGHUP handler, reload disabled");
            return;
        }
    };

    while hangup.recv().await.is_some() {
        tracing::info!("Received SIGHUP, reloading configuration");
        if let Err(e) = reload(&config).await {
            tracing::error!(error = %e, "Configuration reload failed, keeping current configuration");
        }
    }
}

/// Signal handler for graceful shutdown
///
/// Listens for Ctrl+C (SIGINT) and SIGTERM. If a handler cannot be installed
/// that signal is simply not awaited.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");

    crate::telemetry::shutdown_telemetry().await;
}
