//! One method per backend endpoint.
//!
//! Every call goes through [`ApiClient::execute`], which logs the exchange and
//! turns failures into [`ApiError`].

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::error::ApiError;
use super::filters::{BestPracticeFilters, CommandFilters, ResearchFilters};
use super::types::{
    BestPractice, BestPracticesResponse, Command, CommandsResponse, ExecuteCommandRequest,
    ExecuteCommandResponse, HealthResponse, MessageResponse, Operation, OperationsResponse,
    PracticeDecision, Repository, RepositoryAnalysis, ResearchResults, ResearchStatus,
    StatsResponse, UpdatePracticeStatusRequest,
};

/// The edge router's `/api` prefix on its default listen port.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8787/api";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed client for the backend API.
///
/// Endpoint paths are appended to the base URL, so a base of
/// `http://host/api` sends `getStats` to `http://host/api/stats`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an [`ApiError`] with status 0 if `base_url` is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::unexpected(format!("Invalid API base URL '{base_url}': {e}")))?;

        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ApiError::unexpected(format!(
                "API base URL must be http(s), got '{base_url}'"
            )));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::unexpected(e.to_string()))?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Joins `segments` onto the base path, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::unexpected(format!("Cannot append a path to {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.url(segments)?;
        Ok(self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json")))
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = request.build().map_err(ApiError::from)?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(%method, path, "API request");

        let response = self.client.execute(request).await.map_err(|e| {
            warn!(%method, path, error = %e, "API request failed");
            ApiError::from(e)
        })?;

        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "API response");

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        response.json::<T>().await.map_err(ApiError::from)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, segments)?).await
    }

    async fn get_with<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(self.request(Method::GET, segments)?.query(query))
            .await
    }

    async fn send<T, B>(&self, method: Method, segments: &[&str], body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, segments)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request).await
    }

    // --- health & stats ---

    pub async fn get_health(&self) -> Result<HealthResponse, ApiError> {
        self.get(&["health"]).await
    }

    pub async fn get_stats(&self) -> Result<StatsResponse, ApiError> {
        self.get(&["stats"]).await
    }

    // --- research ---

    pub async fn get_research_results(&self, filters: &ResearchFilters) -> Result<ResearchResults, ApiError> {
        self.get_with(&["research", "results"], filters).await
    }

    pub async fn get_research_status(&self) -> Result<ResearchStatus, ApiError> {
        self.get(&["research", "status"]).await
    }

    pub async fn start_research(&self) -> Result<MessageResponse, ApiError> {
        self.send::<_, ()>(Method::POST, &["research", "start"], None).await
    }

    pub async fn stop_research(&self) -> Result<MessageResponse, ApiError> {
        self.send::<_, ()>(Method::POST, &["research", "stop"], None).await
    }

    // --- commands ---

    pub async fn get_commands(&self, filters: &CommandFilters) -> Result<CommandsResponse, ApiError> {
        self.get_with(&["colby", "commands"], filters).await
    }

    pub async fn get_command(&self, id: &str) -> Result<Command, ApiError> {
        self.get(&["colby", "commands", id]).await
    }

    pub async fn execute_command(&self, command: &str, repository: &str) -> Result<ExecuteCommandResponse, ApiError> {
        let body = ExecuteCommandRequest { command, repository };
        self.send(Method::POST, &["colby", "execute"], Some(&body)).await
    }

    // --- best practices ---

    pub async fn get_best_practices(&self, filters: &BestPracticeFilters) -> Result<BestPracticesResponse, ApiError> {
        self.get_with(&["colby", "best-practices"], filters).await
    }

    pub async fn get_best_practice(&self, id: &str) -> Result<BestPractice, ApiError> {
        self.get(&["colby", "best-practices", id]).await
    }

    pub async fn update_best_practice_status(
        &self,
        id: &str,
        status: PracticeDecision,
    ) -> Result<MessageResponse, ApiError> {
        let body = UpdatePracticeStatusRequest { status };
        self.send(Method::PATCH, &["colby", "best-practices", id, "status"], Some(&body))
            .await
    }

    // --- operations ---

    pub async fn get_operations(&self) -> Result<OperationsResponse, ApiError> {
        self.get(&["operations"]).await
    }

    pub async fn get_operation(&self, id: &str) -> Result<Operation, ApiError> {
        self.get(&["operations", id]).await
    }

    pub async fn cancel_operation(&self, id: &str) -> Result<MessageResponse, ApiError> {
        self.send::<_, ()>(Method::POST, &["operations", id, "cancel"], None).await
    }

    // --- repositories ---

    pub async fn get_repository(&self, id: &str) -> Result<Repository, ApiError> {
        self.get(&["repositories", id]).await
    }

    pub async fn get_repository_analysis(&self, id: &str) -> Result<RepositoryAnalysis, ApiError> {
        self.get(&["repositories", id, "analysis"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_base() {
        assert!(ApiClient::new("ftp://example.com/api").is_err());
        assert!(ApiClient::new("not a url").is_err());
        assert!(ApiClient::new("mailto:ops@example.com").is_err());
    }

    #[test]
    fn test_appends_segments_to_base_path() {
        let client = ApiClient::new(DEFAULT_BASE_URL).unwrap();
        let url = client.url(&["colby", "commands", "42"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8787/api/colby/commands/42");
    }

    #[test]
    fn test_default_base_url_targets_edge_router() {
        let listen = crate::config::Config::default().listen_addr;
        let port = listen.rsplit(':').next().unwrap();

        let base = Url::parse(DEFAULT_BASE_URL).unwrap();
        assert_eq!(base.port().map(|p| p.to_string()).as_deref(), Some(port));
        assert_eq!(base.path(), "/api");
    }

    #[test]
    fn test_trailing_slash_on_base_is_ignored() {
        let client = ApiClient::new("http://localhost/api/").unwrap();
        let url = client.url(&["stats"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost/api/stats");
    }

    #[test]
    fn test_ids_are_percent_encoded() {
        let client = ApiClient::new(DEFAULT_BASE_URL).unwrap();
        let url = client.url(&["repositories", "octo/hello"]).unwrap();
        assert_eq!(url.path(), "/api/repositories/octo%2Fhello");
    }
}
