//! Per-resource reads and mutations wired to the query cache.
//!
//! Reads carry the staleness and polling settings the dashboard uses for each
//! resource. Mutations bypass the cache, are never retried, and invalidate the
//! keys whose data they change once they succeed.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::api::ApiClient;
use super::cache::{QueryCache, QueryKey, QueryOptions, Subscription};
use super::error::ApiError;
use super::filters::{BestPracticeFilters, CommandFilters, ResearchFilters};
use super::keys;
use super::retry::RetryPolicy;
use super::types::{
    BestPractice, BestPracticesResponse, Command, CommandsResponse, ExecuteCommandResponse,
    HealthResponse, MessageResponse, Operation, OperationsResponse, PracticeDecision, Repository,
    RepositoryAnalysis, ResearchResults, ResearchStatus, StatsResponse,
};

pub const HEALTH: QueryOptions = QueryOptions::stale_after(Duration::from_secs(30)).poll_every(Duration::from_secs(60));
pub const STATS: QueryOptions = QueryOptions::stale_after(Duration::from_secs(30)).poll_every(Duration::from_secs(60));
pub const RESEARCH_RESULTS: QueryOptions = QueryOptions::stale_after(Duration::from_secs(60));
pub const RESEARCH_STATUS: QueryOptions = QueryOptions::stale_after(Duration::from_secs(10)).poll_every(Duration::from_secs(5));
pub const COMMANDS: QueryOptions = QueryOptions::stale_after(Duration::from_secs(30));
pub const BEST_PRACTICES: QueryOptions = QueryOptions::stale_after(Duration::from_secs(60));
pub const OPERATIONS: QueryOptions = QueryOptions::stale_after(Duration::from_secs(10)).poll_every(Duration::from_secs(5));
/// Single-item reads are always refetched.
pub const BY_ID: QueryOptions = QueryOptions::stale_after(Duration::ZERO);

/// The dashboard's data layer: an [`ApiClient`] behind a [`QueryCache`].
#[derive(Debug, Clone)]
pub struct Dashboard {
    api: Arc<ApiClient>,
    cache: QueryCache,
}

impl Dashboard {
    pub fn new(api: ApiClient) -> Self {
        Self::with_cache(api, QueryCache::new(RetryPolicy::default()))
    }

    pub fn with_cache(api: ApiClient, cache: QueryCache) -> Self {
        Self {
            api: Arc::new(api),
            cache,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Builds a `'static` fetcher that calls `call` with a shared client.
    fn fetcher<T, F, Fut>(&self, call: F) -> impl Fn() -> Fut + Send + Sync + 'static + use<T, F, Fut>
    where
        F: Fn(Arc<ApiClient>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let api = self.api.clone();
        move || call(api.clone())
    }

    async fn read<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, call: F) -> Result<T, ApiError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(Arc<ApiClient>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        self.cache.fetch(key, options, self.fetcher(call)).await
    }

    /// Like [`Self::read`], but disabled while `id` is empty: no call is made
    /// and `None` is returned.
    async fn read_by_id<T, F, Fut>(&self, id: &str, key: fn(&str) -> QueryKey, call: F) -> Result<Option<T>, ApiError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(Arc<ApiClient>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        if id.is_empty() {
            return Ok(None);
        }
        let owned = id.to_string();
        self.read(key(id), BY_ID, move |api| call(api, owned.clone()))
            .await
            .map(Some)
    }

    fn invalidate(&self, prefixes: &[QueryKey]) {
        for prefix in prefixes {
            self.cache.invalidate(prefix);
        }
    }

    // --- reads ---

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.read(keys::health(), HEALTH, |api| async move { api.get_health().await })
            .await
    }

    pub async fn stats(&self) -> Result<StatsResponse, ApiError> {
        self.read(keys::stats(), STATS, |api| async move { api.get_stats().await })
            .await
    }

    pub async fn research_results(&self, filters: &ResearchFilters) -> Result<ResearchResults, ApiError> {
        let params = filters.clone();
        self.read(keys::research_results(filters), RESEARCH_RESULTS, move |api| {
            let params = params.clone();
            async move { api.get_research_results(&params).await }
        })
        .await
    }

    pub async fn research_status(&self) -> Result<ResearchStatus, ApiError> {
        self.read(keys::research_status(), RESEARCH_STATUS, |api| async move {
            api.get_research_status().await
        })
        .await
    }

    pub async fn commands(&self, filters: &CommandFilters) -> Result<CommandsResponse, ApiError> {
        let params = filters.clone();
        self.read(keys::command_list(filters), COMMANDS, move |api| {
            let params = params.clone();
            async move { api.get_commands(&params).await }
        })
        .await
    }

    pub async fn command(&self, id: &str) -> Result<Option<Command>, ApiError> {
        self.read_by_id(id, keys::command, |api, id| async move { api.get_command(&id).await })
            .await
    }

    pub async fn best_practices(&self, filters: &BestPracticeFilters) -> Result<BestPracticesResponse, ApiError> {
        let params = filters.clone();
        self.read(keys::best_practice_list(filters), BEST_PRACTICES, move |api| {
            let params = params.clone();
            async move { api.get_best_practices(&params).await }
        })
        .await
    }

    pub async fn best_practice(&self, id: &str) -> Result<Option<BestPractice>, ApiError> {
        self.read_by_id(id, keys::best_practice, |api, id| async move {
            api.get_best_practice(&id).await
        })
        .await
    }

    pub async fn operations(&self) -> Result<OperationsResponse, ApiError> {
        self.read(keys::operations(), OPERATIONS, |api| async move { api.get_operations().await })
            .await
    }

    pub async fn operation(&self, id: &str) -> Result<Option<Operation>, ApiError> {
        self.read_by_id(id, keys::operation, |api, id| async move { api.get_operation(&id).await })
            .await
    }

    pub async fn repository(&self, id: &str) -> Result<Option<Repository>, ApiError> {
        self.read_by_id(id, keys::repository, |api, id| async move { api.get_repository(&id).await })
            .await
    }

    pub async fn repository_analysis(&self, id: &str) -> Result<Option<RepositoryAnalysis>, ApiError> {
        self.read_by_id(id, keys::repository_analysis, |api, id| async move {
            api.get_repository_analysis(&id).await
        })
        .await
    }

    // --- polling ---

    pub fn watch_health(&self) -> Subscription<HealthResponse> {
        self.cache.watch(
            keys::health(),
            HEALTH,
            self.fetcher(|api| async move { api.get_health().await }),
        )
    }

    pub fn watch_stats(&self) -> Subscription<StatsResponse> {
        self.cache.watch(
            keys::stats(),
            STATS,
            self.fetcher(|api| async move { api.get_stats().await }),
        )
    }

    pub fn watch_research_status(&self) -> Subscription<ResearchStatus> {
        self.cache.watch(
            keys::research_status(),
            RESEARCH_STATUS,
            self.fetcher(|api| async move { api.get_research_status().await }),
        )
    }

    pub fn watch_operations(&self) -> Subscription<OperationsResponse> {
        self.cache.watch(
            keys::operations(),
            OPERATIONS,
            self.fetcher(|api| async move { api.get_operations().await }),
        )
    }

    // --- mutations ---

    pub async fn start_research(&self) -> Result<MessageResponse, ApiError> {
        let response = self.api.start_research().await?;
        info!(message = %response.message, "Research started");
        self.invalidate(&[keys::research_status(), keys::stats()]);
        Ok(response)
    }

    pub async fn stop_research(&self) -> Result<MessageResponse, ApiError> {
        let response = self.api.stop_research().await?;
        info!(message = %response.message, "Research stopped");
        self.invalidate(&[keys::research_status()]);
        Ok(response)
    }

    pub async fn execute_command(&self, command: &str, repository: &str) -> Result<ExecuteCommandResponse, ApiError> {
        let response = self.api.execute_command(command, repository).await?;
        info!(command_id = %response.command_id, repository, "Command queued");
        self.invalidate(&[keys::commands(), keys::stats()]);
        Ok(response)
    }

    pub async fn update_best_practice_status(
        &self,
        id: &str,
        status: PracticeDecision,
    ) -> Result<MessageResponse, ApiError> {
        let response = self.api.update_best_practice_status(id, status).await?;
        info!(id, ?status, "Best practice reviewed");
        self.invalidate(&[keys::best_practice(id), keys::best_practices()]);
        Ok(response)
    }

    pub async fn cancel_operation(&self, id: &str) -> Result<MessageResponse, ApiError> {
        let response = self.api.cancel_operation(id).await?;
        info!(id, "Operation cancelled");
        self.invalidate(&[keys::operations()]);
        Ok(response)
    }
}
