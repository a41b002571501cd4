//! In-memory asset store.

use super::store::AssetStore;
use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Asset {
    content_type: String,
    body: Bytes,
}

/// Asset store holding its files in memory, keyed by absolute path.
///
/// Paths ending in `/` resolve to the `index.html` below them, matching the
/// directory store.
///
/// # Use Cases
///
/// - Router tests that need precise control over which assets exist
/// - Deployments that embed a small SPA shell in the binary
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    assets: HashMap<String, Asset>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an asset, builder style.
    pub fn with_asset(
        mut self,
        path: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        self.insert(path, content_type, body);
        self
    }

    pub fn insert(
        &mut self,
        path: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Bytes>,
    ) {
        self.assets.insert(
            path.into(),
            Asset {
                content_type: content_type.into(),
                body: body.into(),
            },
        );
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn lookup(&self, path: &str) -> Option<&Asset> {
        if path.ends_with('/') {
            self.assets.get(&format!("{path}index.html"))
        } else {
            self.assets.get(path)
        }
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn fetch(&self, request: Request) -> Response {
        let Some(asset) = self.lookup(request.uri().path()) else {
            return StatusCode::NOT_FOUND.into_response();
        };

        let body = if request.method() == Method::HEAD {
            Body::empty()
        } else {
            Body::from(asset.body.clone())
        };

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, asset.content_type.clone()),
                (header::CONTENT_LENGTH, asset.body.len().to_string()),
            ],
            body,
        )
            .into_response()
    }
}
