//! Handler resolving page and asset requests against the asset store.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::domain::route::is_client_route;
use crate::error::AppError;
use crate::infrastructure::assets::AssetStore;
use crate::state::AppState;

/// Serves static assets with single-page-app fallback.
///
/// # Endpoint
///
/// `ANY /{*path}` (everything outside `/api/`)
///
/// # Resolution
///
/// 1. The path is looked up as given; anything but 404 is returned unchanged
/// 2. On a miss, extensionless paths are answered with the SPA shell
/// 3. Otherwise `404 Not Found` (`text/plain`)
pub async fn static_handler(State(state): State<AppState>, request: Request) -> Response {
    resolve(state.assets.as_ref(), &state.fallback_document, request).await
}

/// Resolution procedure behind [`static_handler`], independent of router state.
///
/// Performs at most two store lookups: the requested path, then the fallback
/// document. Paths whose final segment contains a `.` never reach the second.
pub async fn resolve(store: &dyn AssetStore, fallback_document: &str, request: Request) -> Response {
    let (parts, _body) = request.into_parts();

    let response = store.fetch(lookup(&parts, parts.uri.clone())).await;
    if response.status() != StatusCode::NOT_FOUND {
        metrics::counter!("edge_static_requests_total", "outcome" => "hit").increment(1);
        return response;
    }

    let path = parts.uri.path();
    if is_client_route(path) {
        match fallback_document.parse::<Uri>() {
            Ok(uri) => {
                let response = store.fetch(lookup(&parts, uri)).await;
                if response.status() != StatusCode::NOT_FOUND {
                    debug!(path, "Serving SPA shell for client-side route");
                    metrics::counter!("edge_static_requests_total", "outcome" => "fallback")
                        .increment(1);
                    return response;
                }
                warn!(fallback_document, "SPA shell is missing from the asset store");
            }
            Err(e) => warn!(fallback_document, error = %e, "Invalid fallback document path"),
        }
    }

    metrics::counter!("edge_static_requests_total", "outcome" => "not_found").increment(1);
    AppError::NotFound.into_response()
}

/// Rebuilds a body-less lookup request carrying the original method and headers.
fn lookup(parts: &Parts, uri: Uri) -> Request {
    let mut request = Request::new(Body::empty());
    *request.method_mut() = parts.method.clone();
    *request.uri_mut() = uri;
    *request.version_mut() = parts.version;
    *request.headers_mut() = parts.headers.clone();
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::assets::MockAssetStore;
    use axum::body::to_bytes;
    use axum::http::header;
    use mockall::predicate::function;

    fn get(path: &str) -> Request {
        Request::builder()
            .uri(path)
            .header(header::ACCEPT, "text/html")
            .body(Body::empty())
            .unwrap()
    }

    fn ok(body: &'static str) -> Response {
        (StatusCode::OK, body).into_response()
    }

    fn not_found() -> Response {
        StatusCode::NOT_FOUND.into_response()
    }

    fn path_is(expected: &'static str) -> impl Fn(&Request) -> bool {
        move |request: &Request| request.uri().path() == expected
    }

    #[tokio::test]
    async fn test_direct_hit_skips_fallback() {
        let mut store = MockAssetStore::new();
        store
            .expect_fetch()
            .with(function(path_is("/assets/app.js")))
            .times(1)
            .returning(|_| ok("js"));

        let response = resolve(&store, "/index.html", get("/assets/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_404_status_is_returned_unchanged() {
        let mut store = MockAssetStore::new();
        store
            .expect_fetch()
            .times(1)
            .returning(|_| StatusCode::NOT_MODIFIED.into_response());

        let response = resolve(&store, "/index.html", get("/assets/app.js")).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_client_route_falls_back_once() {
        let mut store = MockAssetStore::new();
        store
            .expect_fetch()
            .with(function(path_is("/dashboard-page")))
            .times(1)
            .returning(|_| not_found());
        store
            .expect_fetch()
            .with(function(path_is("/index.html")))
            .times(1)
            .returning(|_| ok("<html>shell</html>"));

        let response = resolve(&store, "/index.html", get("/dashboard-page")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<html>shell</html>");
    }

    #[tokio::test]
    async fn test_fallback_lookup_keeps_method_and_headers() {
        let mut store = MockAssetStore::new();
        store
            .expect_fetch()
            .with(function(path_is("/settings")))
            .times(1)
            .returning(|_| not_found());
        store
            .expect_fetch()
            .with(function(|request: &Request| {
                request.uri().path() == "/index.html"
                    && request.headers()[header::ACCEPT] == "text/html"
            }))
            .times(1)
            .returning(|_| ok("shell"));

        let response = resolve(&store, "/index.html", get("/settings?tab=1")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_file_miss_never_tries_fallback() {
        let mut store = MockAssetStore::new();
        store
            .expect_fetch()
            .with(function(path_is("/missing.png")))
            .times(1)
            .returning(|_| not_found());

        let response = resolve(&store, "/index.html", get("/missing.png")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Not Found");
    }

    #[tokio::test]
    async fn test_missing_shell_is_not_found() {
        let mut store = MockAssetStore::new();
        store.expect_fetch().times(2).returning(|_| not_found());

        let response = resolve(&store, "/index.html", get("/repositories/42")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
