//! Query cache with in-flight deduplication, staleness windows and polling.
//!
//! Reads go through [`QueryCache::fetch`], keyed by a [`QueryKey`]:
//!
//! - a fresh entry is returned without a network call
//! - a stale entry is returned immediately and refreshed in the background
//! - a missing or invalidated entry is fetched, and the caller waits for it
//!
//! At most one fetch per key is in flight; concurrent callers for the same key
//! await the same result. Failed fetches are retried according to the cache's
//! [`RetryPolicy`] before the error is returned.
//!
//! [`QueryCache::watch`] keeps a key current for as long as the returned
//! [`Subscription`] is alive: it refetches on a fixed interval and whenever
//! the key is invalidated.
//!
//! Entries that nobody watches or fetches for [`DEFAULT_IDLE_TTL`] are evicted.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{OnceCell, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_retry::Retry;
use tracing::{debug, warn};

use super::error::ApiError;
use super::retry::RetryPolicy;

/// How long an unwatched entry survives without being read.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(5 * 60);

type Erased = Arc<dyn Any + Send + Sync>;
type InFlight = Arc<OnceCell<Result<Erased, ApiError>>>;

/// Composite cache key: resource segments followed by serialized parameters.
///
/// Invalidation matches by prefix, so `["commands"]` covers every commands
/// list and every single command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Appends one segment.
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// Appends the JSON form of `params` as one segment.
    ///
    /// Equal parameters always produce equal keys because the filter structs
    /// serialize their fields in declaration order.
    pub fn with_params<P: Serialize>(self, params: &P) -> Self {
        let encoded = serde_json::to_string(params).unwrap_or_else(|_| "null".to_string());
        self.push(encoded)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Per-read freshness settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOptions {
    /// How long a fetched value is served without refreshing.
    pub stale_time: Duration,
    /// Fixed refetch period for watched keys, regardless of staleness.
    pub refetch_interval: Option<Duration>,
}

impl QueryOptions {
    pub const fn stale_after(stale_time: Duration) -> Self {
        Self {
            stale_time,
            refetch_interval: None,
        }
    }

    pub const fn poll_every(self, interval: Duration) -> Self {
        Self {
            stale_time: self.stale_time,
            refetch_interval: Some(interval),
        }
    }
}

struct Entry {
    value: Option<Erased>,
    fetched_at: Option<Instant>,
    invalidated: bool,
    in_flight: Option<InFlight>,
    watchers: usize,
    last_used: Instant,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            value: None,
            fetched_at: None,
            invalidated: false,
            in_flight: None,
            watchers: 0,
            last_used: Instant::now(),
        }
    }
}

impl Entry {
    fn is_idle(&self, idle_ttl: Duration) -> bool {
        self.watchers == 0 && self.in_flight.is_none() && self.last_used.elapsed() >= idle_ttl
    }
}

enum Lookup {
    Fresh(Erased),
    Stale(Erased),
    Missing,
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    retry: RetryPolicy,
    idle_ttl: Duration,
    invalidations: watch::Sender<u64>,
}

/// Shared, cheaply cloneable query cache.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries().len())
            .field("retry", &self.inner.retry)
            .field("idle_ttl", &self.inner.idle_ttl)
            .finish()
    }
}

impl QueryCache {
    pub fn new(retry: RetryPolicy) -> Self {
        Self::with_idle_ttl(retry, DEFAULT_IDLE_TTL)
    }

    /// Like [`Self::new`], but evicts unwatched entries after `idle_ttl`
    /// without a read.
    pub fn with_idle_ttl(retry: RetryPolicy, idle_ttl: Duration) -> Self {
        let (invalidations, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                retry,
                idle_ttl,
                invalidations,
            }),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Classifies the entry for `key` and marks it as used. Idle entries are
    /// swept first.
    fn lookup(&self, key: &QueryKey, options: QueryOptions) -> Lookup {
        let mut entries = self.entries();

        let before = entries.len();
        let idle_ttl = self.inner.idle_ttl;
        entries.retain(|_, entry| !entry.is_idle(idle_ttl));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "Query cache EVICT");
        }

        let Some(entry) = entries.get_mut(key) else {
            return Lookup::Missing;
        };
        entry.last_used = Instant::now();

        match &*entry {
            Entry {
                value: Some(value),
                fetched_at: Some(at),
                invalidated: false,
                ..
            } if at.elapsed() < options.stale_time => Lookup::Fresh(value.clone()),
            Entry {
                value: Some(value),
                invalidated: false,
                ..
            } => Lookup::Stale(value.clone()),
            _ => Lookup::Missing,
        }
    }

    /// Returns the value for `key`, fetching it if needed.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's last error once retries are exhausted, or an
    /// [`ApiError`] with status 0 if `key` already holds a value of another type.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<T, ApiError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        match self.lookup(&key, options) {
            Lookup::Fresh(value) => {
                debug!(%key, "Query cache HIT");
                downcast(&key, value)
            }
            Lookup::Stale(value) => {
                debug!(%key, "Query cache STALE, refreshing in background");
                self.spawn_refresh(key.clone(), fetcher);
                downcast(&key, value)
            }
            Lookup::Missing => {
                debug!(%key, "Query cache MISS");
                self.refresh(key, fetcher).await
            }
        }
    }

    /// Fetches `key` now, ignoring freshness, and stores the result.
    ///
    /// Joins the in-flight fetch for `key` if there is one.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's last error once retries are exhausted.
    pub async fn refresh<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, ApiError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let cell = {
            let mut entries = self.entries();
            let entry = entries.entry(key.clone()).or_default();
            entry
                .in_flight
                .get_or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let retry = self.inner.retry;
        let attempt_key = key.clone();
        let result = cell
            .get_or_init(|| async move {
                let mut attempt = 0u32;
                Retry::spawn(retry.delays(), || {
                    attempt += 1;
                    if attempt > 1 {
                        debug!(key = %attempt_key, attempt, "Retrying query");
                    }
                    fetcher()
                })
                .await
                .map(|value| Arc::new(value) as Erased)
            })
            .await
            .clone();

        {
            let mut entries = self.entries();
            if let Some(entry) = entries.get_mut(&key)
                && entry
                    .in_flight
                    .as_ref()
                    .is_some_and(|current| Arc::ptr_eq(current, &cell))
            {
                entry.in_flight = None;
                if let Ok(value) = &result {
                    entry.value = Some(value.clone());
                    entry.fetched_at = Some(Instant::now());
                    entry.last_used = Instant::now();
                    entry.invalidated = false;
                }
            }
        }

        match result {
            Ok(value) => downcast(&key, value),
            Err(e) => {
                warn!(%key, status = e.status, error = %e, "Query failed");
                Err(e)
            }
        }
    }

    fn spawn_refresh<T, F, Fut>(&self, key: QueryKey, fetcher: F)
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let cache = self.clone();
        tokio::spawn(async move {
            // Failures are logged by `refresh`; the stale value stays cached.
            let _ = cache.refresh(key, fetcher).await;
        });
    }

    /// Returns the cached value for `key` without fetching, fresh or not.
    pub fn peek<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let value = self.entries().get(key)?.value.clone()?;
        downcast(key, value).ok()
    }

    pub fn is_invalidated(&self, key: &QueryKey) -> bool {
        self.entries().get(key).is_some_and(|entry| entry.invalidated)
    }

    /// Marks every key starting with `prefix` as invalidated.
    ///
    /// Invalidated entries are not served again: the next read waits for a
    /// fresh fetch, and watchers of those keys refetch immediately. A fetch that
    /// was in flight when the key was invalidated no longer updates the cache.
    ///
    /// Returns the number of entries marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let marked = {
            let mut entries = self.entries();
            entries
                .iter_mut()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(_, entry)| {
                    entry.invalidated = true;
                    entry.in_flight = None;
                })
                .count()
        };

        self.inner
            .invalidations
            .send_modify(|generation| *generation = generation.wrapping_add(1));
        debug!(%prefix, marked, "Query cache INVALIDATE");
        marked
    }

    /// Keeps `key` up to date until the returned subscription is dropped.
    ///
    /// The first read honours the cache: a fresh value is published as is, a
    /// stale one is published and then refetched. After that the key is
    /// refetched every `options.refetch_interval` (if set) and whenever it is
    /// invalidated. The entry is never evicted while the subscription lives.
    pub fn watch<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetcher: F) -> Subscription<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(QuerySnapshot::default());
        let mut invalidations = self.inner.invalidations.subscribe();
        let cache = self.clone();
        let task_key = key.clone();
        let fetcher = Arc::new(fetcher);
        let watcher = Watcher::register(self, key.clone());

        let task = tokio::spawn(async move {
            let _watcher = watcher;
            let mut force = false;
            loop {
                let call = {
                    let fetcher = fetcher.clone();
                    move || (*fetcher)()
                };
                let lookup = if force {
                    Lookup::Missing
                } else {
                    cache.lookup(&task_key, options)
                };
                let result = match lookup {
                    Lookup::Fresh(value) => downcast(&task_key, value),
                    Lookup::Stale(value) => {
                        debug!(key = %task_key, "Watched query STALE, refetching");
                        publish(&tx, downcast(&task_key, value));
                        cache.refresh(task_key.clone(), call).await
                    }
                    Lookup::Missing => cache.refresh(task_key.clone(), call).await,
                };
                publish(&tx, result);

                let deadline = options.refetch_interval.map(|every| Instant::now() + every);
                force = loop {
                    tokio::select! {
                        _ = sleep_until(deadline) => break true,
                        changed = invalidations.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            if cache.is_invalidated(&task_key) {
                                break false;
                            }
                        }
                    }
                };
            }
        });

        Subscription { key, rx, task }
    }
}

/// Holds a watcher count on a key for as long as a subscription task runs.
struct Watcher {
    cache: QueryCache,
    key: QueryKey,
}

impl Watcher {
    fn register(cache: &QueryCache, key: QueryKey) -> Self {
        cache.entries().entry(key.clone()).or_default().watchers += 1;
        Self {
            cache: cache.clone(),
            key,
        }
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        if let Some(entry) = self.cache.entries().get_mut(&self.key) {
            entry.watchers = entry.watchers.saturating_sub(1);
            entry.last_used = Instant::now();
        }
    }
}

fn publish<T>(tx: &watch::Sender<QuerySnapshot<T>>, result: Result<T, ApiError>) {
    tx.send_modify(|snapshot| match result {
        Ok(data) => {
            snapshot.data = Some(data);
            snapshot.error = None;
            snapshot.updated_at = Some(Utc::now());
        }
        Err(e) => snapshot.error = Some(e),
    });
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn downcast<T>(key: &QueryKey, value: Erased) -> Result<T, ApiError>
where
    T: Clone + Send + Sync + 'static,
{
    value
        .downcast::<T>()
        .map(|value| T::clone(&value))
        .map_err(|_| ApiError::unexpected(format!("Cached value for {key} has a different type")))
}

/// Latest state of a watched key.
#[derive(Debug, Clone)]
pub struct QuerySnapshot<T> {
    /// Last successfully fetched value; kept when a later refetch fails.
    pub data: Option<T>,
    /// Error from the most recent fetch, if it failed.
    pub error: Option<ApiError>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for QuerySnapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
        }
    }
}

/// Handle to a watched key. Dropping it stops the background refetching.
pub struct Subscription<T> {
    key: QueryKey,
    rx: watch::Receiver<QuerySnapshot<T>>,
    task: JoinHandle<()>,
}

impl<T: Clone> Subscription<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn snapshot(&self) -> QuerySnapshot<T> {
        self.rx.borrow().clone()
    }

    /// Waits for the next published snapshot.
    ///
    /// Returns `false` if the background task has stopped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
