//! Shared state injected into the edge router's handlers.

use std::sync::Arc;

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::infrastructure::assets::AssetStore;
use crate::infrastructure::upstream::UpstreamClient;

/// Immutable per-process state. Cloning is cheap; nothing in here is mutated
/// while requests are served.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub assets: Arc<dyn AssetStore>,
    /// Absolute path of the SPA shell, e.g. `/index.html`.
    pub fallback_document: Arc<str>,
    /// Largest inbound body the proxy buffers and forwards.
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        upstream: UpstreamClient,
        assets: Arc<dyn AssetStore>,
        fallback_document: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            upstream: Arc::new(upstream),
            assets,
            fallback_document: fallback_document.into(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
