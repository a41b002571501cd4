#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::Request;
use axum::response::Response;
use axum_test::TestServer;
use dashboard_edge::config::DEFAULT_USER_AGENT;
use dashboard_edge::infrastructure::assets::{AssetStore, MemoryAssetStore};
use dashboard_edge::infrastructure::upstream::UpstreamClient;
use dashboard_edge::routes::app_router;
use dashboard_edge::state::AppState;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SHELL: &str = "<!doctype html><html><body><div id=\"root\"></div></body></html>";

/// The built frontend as the router sees it in tests.
pub fn spa_assets() -> MemoryAssetStore {
    MemoryAssetStore::new()
        .with_asset("/index.html", "text/html; charset=utf-8", SHELL)
        .with_asset(
            "/assets/app.js",
            "text/javascript",
            "console.log('dashboard')",
        )
        .with_asset("/favicon.ico", "image/x-icon", &b"\x00\x00\x01\x00"[..])
}

pub fn create_test_state(upstream_origin: &str, assets: Arc<dyn AssetStore>) -> AppState {
    let upstream = UpstreamClient::new(upstream_origin, DEFAULT_USER_AGENT, Duration::from_secs(5))
        .expect("upstream client");
    AppState::new(upstream, assets, "/index.html")
}

pub fn create_test_server(upstream_origin: &str, assets: Arc<dyn AssetStore>) -> TestServer {
    let app = app_router(create_test_state(upstream_origin, assets));
    TestServer::new(app).unwrap()
}

/// An origin nothing listens on: binds a port, then releases it.
pub fn refused_origin() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Wraps a store and records every path looked up.
#[derive(Default)]
pub struct CountingStore<S> {
    inner: S,
    lookups: Mutex<Vec<String>>,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl<S: AssetStore> AssetStore for CountingStore<S> {
    async fn fetch(&self, request: Request) -> Response {
        self.lookups
            .lock()
            .unwrap()
            .push(request.uri().path().to_string());
        self.inner.fetch(request).await
    }
}
