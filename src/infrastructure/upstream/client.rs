//! Upstream API client used by the proxy handler.

use super::error::ProxyError;
use axum::body::Bytes;
use axum::http::{Method, header};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Connection-pooled client bound to a single upstream origin.
///
/// Every forwarded request carries exactly two outbound headers: a JSON
/// content type and the configured client identifier. Inbound headers
/// (cookies, authorization, ...) are not forwarded.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    origin: String,
    user_agent: String,
}

impl UpstreamClient {
    /// Creates a client for `origin` (no trailing slash).
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Client`] if the TLS backend cannot be initialised.
    pub fn new(
        origin: impl Into<String>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProxyError::Client)?;

        Ok(Self {
            client,
            origin: origin.into(),
            user_agent: user_agent.into(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Builds the upstream URL: origin, stripped path, then the original query.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(query) => format!("{}{}?{}", self.origin, path, query),
            None => format!("{}{}", self.origin, path),
        }
    }

    /// Sends one request upstream.
    ///
    /// `body` is forwarded verbatim when present. Any HTTP response, including
    /// 4xx and 5xx, is returned as `Ok`; only transport failures are errors.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Transport`] on DNS, connect, TLS or timeout failures.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        body: Option<Bytes>,
    ) -> Result<reqwest::Response, ProxyError> {
        let url = self.target_url(path, query);
        debug!(%method, %url, "Forwarding request upstream");

        let mut request = self
            .client
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, &self.user_agent);

        if let Some(body) = body {
            request = request.body(body);
        }

        request
            .send()
            .await
            .map_err(|source| ProxyError::Transport { url, source })
    }
}
