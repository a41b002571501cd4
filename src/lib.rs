//! # Dashboard Edge
//!
//! Edge router and typed API client for the GitHub bot dashboard.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Request classification and path rules
//! - **Infrastructure Layer** ([`infrastructure`]) - Upstream HTTP client and static asset stores
//! - **API Layer** ([`api`]) - The edge handler (proxy + static resolver) and middleware
//! - **Client** ([`client`]) - Typed backend client, query cache and view state
//!
//! ## Edge Router
//!
//! Every request is answered by a single fallback handler:
//!
//! - `/api/*` is forwarded to the upstream origin with the `/api` prefix
//!   stripped, and the response is relayed with permissive CORS headers
//! - everything else is served from the asset directory, with extensionless
//!   paths falling back to the single-page-app shell
//!
//! ## Quick Start
//!
//! ```bash
//! # Build the frontend into ./dist, then
//! export UPSTREAM_ORIGIN="https://gh-bot.hacolby.workers.dev"
//! cargo run
//!
//! # Query the backend through the router
//! cargo run --bin dashboard -- stats
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod client;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod telemetry;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::client::{ApiClient, ApiError, Dashboard, QueryCache, RetryPolicy};
    pub use crate::error::AppError;
    pub use crate::infrastructure::assets::{AssetStore, DirAssetStore, MemoryAssetStore};
    pub use crate::infrastructure::upstream::UpstreamClient;
    pub use crate::routes::app_router;
    pub use crate::state::AppState;
}
