//! Directory-backed asset store.

use super::store::AssetStore;
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use std::path::{Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::debug;

/// Serves the built single-page app from a directory on disk.
///
/// Delegates to `tower_http`'s [`ServeDir`], which handles content types,
/// conditional requests, ranges and directory index files.
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
    serve: ServeDir,
}

impl DirAssetStore {
    /// Creates a store rooted at `root`.
    ///
    /// The directory is not required to exist; a missing directory simply
    /// answers every lookup with 404.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        debug!("Serving static assets from {}", root.display());
        let serve = ServeDir::new(&root);
        Self { root, serve }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl AssetStore for DirAssetStore {
    async fn fetch(&self, request: Request) -> Response {
        match self.serve.clone().oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        }
    }
}
