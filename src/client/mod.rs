//! Typed client for the dashboard's backend API.
//!
//! # Layers
//!
//! - [`api`] - One method per backend endpoint, with error normalization
//! - [`cache`] - Query cache: deduplication, staleness windows, polling, invalidation
//! - [`queries`] - Per-resource reads and mutations wired to the cache
//! - [`view_state`] - Explicit view state owned by the consumer
//!
//! ```rust,ignore
//! let api = ApiClient::new("http://127.0.0.1:8787/api")?;
//! let dashboard = Dashboard::new(api);
//!
//! let stats = dashboard.stats().await?;
//! dashboard.execute_command("/colby help", "octo/repo").await?; // invalidates commands + stats
//! ```

pub mod api;
pub mod cache;
pub mod error;
pub mod filters;
pub mod keys;
pub mod queries;
pub mod retry;
pub mod types;
pub mod view_state;

pub use api::ApiClient;
pub use cache::{QueryCache, QueryKey, QueryOptions, QuerySnapshot, Subscription};
pub use error::ApiError;
pub use filters::{BestPracticeFilters, CommandFilters, ResearchFilters};
pub use queries::Dashboard;
pub use retry::RetryPolicy;
pub use view_state::{Theme, ViewState};
