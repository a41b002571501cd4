//! Proxy error types.

use thiserror::Error;

/// Errors that can occur while forwarding a request upstream.
///
/// None of these reach the client verbatim; the proxy handler logs them and
/// answers with [`crate::error::AppError::PayloadTooLarge`] for an oversized
/// body and [`crate::error::AppError::UpstreamUnavailable`] for everything else.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to build upstream HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to read inbound request body: {0}")]
    Body(#[source] axum::Error),

    #[error("inbound request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("upstream request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ProxyError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Client(_) => "client",
            ProxyError::Body(_) => "body",
            ProxyError::BodyTooLarge { .. } => "body_too_large",
            ProxyError::Transport { source, .. } if source.is_timeout() => "timeout",
            ProxyError::Transport { source, .. } if source.is_connect() => "connect",
            ProxyError::Transport { .. } => "transport",
        }
    }
}
