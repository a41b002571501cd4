//! Request classification for the edge router.

/// Reserved prefix for requests forwarded to the upstream API.
pub const API_PREFIX: &str = "/api";

/// Which procedure handles an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Forwarded to the upstream origin with the prefix stripped.
    Api,
    /// Resolved against the static asset store, with SPA fallback.
    Static,
}

impl RouteKind {
    /// Classifies a request path.
    ///
    /// Only paths under `/api/` are proxied. A bare `/api` (no trailing slash)
    /// is treated as a page route.
    pub fn classify(path: &str) -> Self {
        match path.strip_prefix(API_PREFIX) {
            Some(rest) if rest.starts_with('/') => RouteKind::Api,
            _ => RouteKind::Static,
        }
    }
}

/// Strips the reserved API prefix, yielding the path to request upstream.
///
/// `/api/colby/commands/42` becomes `/colby/commands/42`. Paths without the
/// prefix are returned unchanged.
pub fn upstream_path(path: &str) -> &str {
    path.strip_prefix(API_PREFIX).unwrap_or(path)
}

/// Returns `true` when the final path segment has no file extension.
///
/// Such paths are treated as client-side routes of the single-page app and may
/// be answered with the SPA shell; anything that looks like a file (`app.js`,
/// `missing.png`) is not.
pub fn is_client_route(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    !last_segment.contains('.')
}
