//! HTTP server initialization and runtime setup.
//!
//! Builds the upstream client and asset store, then runs the Axum server until
//! Ctrl+C or SIGTERM.

use crate::config::Config;
use crate::infrastructure::assets::{AssetStore, DirAssetStore};
use crate::infrastructure::upstream::UpstreamClient;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the edge router with the given configuration.
///
/// Initializes:
/// - Upstream HTTP client (connection pool, timeout, client identifier)
/// - Directory-backed asset store
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - The HTTP client cannot be created
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let upstream = UpstreamClient::new(
        config.upstream_origin.clone(),
        config.upstream_user_agent.clone(),
        config.upstream_timeout(),
    )
    .context("Failed to create upstream client")?;
    tracing::info!("Proxying /api/* to {}", upstream.origin());

    if !config.assets_dir.is_dir() {
        tracing::warn!(
            "Assets directory {} does not exist; page requests will return 404",
            config.assets_dir.display()
        );
    }
    let assets: Arc<dyn AssetStore> = Arc::new(DirAssetStore::new(&config.assets_dir));

    let state = AppState::new(upstream, assets, config.fallback_document.as_str())
        .with_max_body_bytes(config.max_body_bytes);
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
