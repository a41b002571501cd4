//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `/api/*`   - Proxied to the upstream origin with the prefix stripped
//! - `/*`       - Static assets, with the SPA shell for extensionless paths
//!
//! Everything is handled by a single fallback so that no path can escape
//! classification; see [`crate::api::handlers::edge_handler`].
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging

use crate::api::handlers::edge_handler;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;

/// Constructs the edge router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .fallback(edge_handler)
        .with_state(state)
        .layer(tracing::layer())
}
