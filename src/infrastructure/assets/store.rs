//! Asset store trait.

use async_trait::async_trait;
use axum::extract::Request;
use axum::response::Response;

/// Resolves a request against a set of static assets.
///
/// This is the single asset binding the router knows about. A store answers
/// every request with a response; a miss is reported as `404 Not Found`, never
/// as an error, so the router can decide whether to try the SPA shell.
///
/// # Implementations
///
/// - [`crate::infrastructure::assets::DirAssetStore`] - Files on disk via `ServeDir`
/// - [`crate::infrastructure::assets::MemoryAssetStore`] - In-memory map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Looks up the asset addressed by the request path.
    ///
    /// # Returns
    ///
    /// - The asset response (any status other than 404) on a hit
    /// - `404 Not Found` when no asset matches
    async fn fetch(&self, request: Request) -> Response;
}
