//! Entry point for every inbound request.

use axum::extract::{Request, State};
use axum::response::Response;

use crate::api::handlers::{proxy_handler, static_handler};
use crate::domain::route::RouteKind;
use crate::state::AppState;

/// Classifies the request and dispatches it.
///
/// # Routing
///
/// - `/api/*` - forwarded upstream by [`proxy_handler`]
/// - anything else - resolved against static assets by [`static_handler`]
///
/// The router keeps no state between requests; each call ends in exactly one
/// response.
pub async fn edge_handler(State(state): State<AppState>, request: Request) -> Response {
    match RouteKind::classify(request.uri().path()) {
        RouteKind::Api => proxy_handler(State(state), request).await,
        RouteKind::Static => static_handler(State(state), request).await,
    }
}
