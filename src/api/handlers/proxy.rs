//! Handler forwarding `/api/*` requests to the upstream origin.

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use tracing::{debug, error, warn};

use crate::domain::route::upstream_path;
use crate::error::AppError;
use crate::infrastructure::upstream::ProxyError;
use crate::state::AppState;

pub const ALLOWED_ORIGIN: &str = "*";
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Headers that describe the upstream connection rather than the payload.
/// The response body is re-framed on the way out, so these are not copied.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Forwards an API request upstream and relays the response.
///
/// # Endpoint
///
/// `ANY /api/{*path}`
///
/// # Behavior
///
/// - The `/api` prefix is stripped; the query string is kept verbatim
/// - Method is replicated; bodies of non-GET/HEAD requests are read fully and forwarded
/// - Bodies over `AppState::max_body_bytes` are refused before anything is sent upstream
/// - Upstream status, headers and body are relayed for success and error statuses alike
/// - CORS headers allowing any origin are set on every relayed response
///
/// # Errors
///
/// - Oversized bodies: `413 Payload Too Large` with `{"error":"Request body too large"}`
/// - Transport failures: `500 Internal Server Error` with
///   `{"error":"Failed to connect to API"}`. Nothing is retried.
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    match forward(&state, request).await {
        Ok(response) => {
            metrics::counter!("edge_proxy_requests_total", "outcome" => "relayed").increment(1);
            response
        }
        Err(e @ ProxyError::BodyTooLarge { .. }) => {
            warn!(kind = e.kind(), error = %e, "Refusing API request");
            metrics::counter!("edge_proxy_requests_total", "outcome" => e.kind()).increment(1);
            AppError::PayloadTooLarge.into_response()
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, "API proxy error");
            metrics::counter!("edge_proxy_requests_total", "outcome" => e.kind()).increment(1);
            AppError::UpstreamUnavailable.into_response()
        }
    }
}

async fn forward(state: &AppState, request: Request) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path = upstream_path(parts.uri.path());

    let body = if carries_body(&parts.method) {
        Some(read_body(&parts.headers, body, state.max_body_bytes).await?)
    } else {
        None
    };

    let upstream = state
        .upstream
        .forward(parts.method.clone(), path, parts.uri.query(), body)
        .await?;

    debug!(status = %upstream.status(), "Upstream responded");

    Ok(relay(upstream))
}

/// Buffers at most `limit` bytes. A declared `Content-Length` over the limit
/// is refused without reading; chunked bodies are cut off once they pass it.
async fn read_body(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<axum::body::Bytes, ProxyError> {
    if declared_length(headers).is_some_and(|len| len > limit as u64) {
        return Err(ProxyError::BodyTooLarge { limit });
    }

    to_bytes(body, limit).await.map_err(|e| {
        if exceeds_limit(&e) {
            ProxyError::BodyTooLarge { limit }
        } else {
            ProxyError::Body(e)
        }
    })
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn exceeds_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// GET and HEAD are the only retrievals forwarded without a body.
fn carries_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}

fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);
    apply_cors(&mut headers);

    let mut response = Body::from_stream(upstream.bytes_stream()).into_response();
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Overwrites the three CORS headers regardless of what upstream sent.
pub fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOWED_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
}
