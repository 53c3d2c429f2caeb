// Query cache store for fetched API data.
// Tracks freshness per key, de-duplicates in-flight requests, and retries failed fetches.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as AsyncMutex;

use crate::error::FetchError;

/// Data younger than this is served without a network call: 5 minutes.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Entries unobserved for this long are dropped: 10 minutes.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(10 * 60);

/// Retries after the first failed attempt.
pub const DEFAULT_RETRY: u32 = 3;

const BASE_RETRY_DELAY: Duration = Duration::from_millis(1000);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Identifies one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full post collection.
    Posts,
    /// A single post, by identifier in string form.
    Post(String),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Posts => write!(f, "posts"),
            QueryKey::Post(id) => write!(f, "post/{}", id),
        }
    }
}

/// Timing and retry behavior shared by every entry of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub stale_time: Duration,
    pub gc_time: Duration,
    pub retry: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
            retry: DEFAULT_RETRY,
        }
    }
}

impl QueryOptions {
    /// Defaults with retries disabled, for deterministic tests.
    pub fn no_retry() -> Self {
        Self {
            retry: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based): doubles from 1s, capped at 30s.
    pub fn retry_delay(attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| BASE_RETRY_DELAY.checked_mul(factor))
            .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
    }
}

/// Whether a fetch may be answered from a fresh entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Serve fresh data from the cache, go to the network otherwise.
    CacheFirst,
    /// Always go to the network (manual refetch).
    Network,
}

/// Point-in-time view of one entry, as the views consume it.
#[derive(Debug, Clone)]
pub struct QueryResult<T> {
    /// Last successful value.
    pub data: Option<Arc<T>>,
    /// Most recent failure, cleared by the next success.
    pub error: Option<FetchError>,
    /// No data and no error yet.
    pub is_loading: bool,
    /// A request for this key is in flight.
    pub is_fetching: bool,
    /// A request is in flight while data or an error is already shown.
    pub is_refetching: bool,
    /// Wall-clock time of the last success (or seed).
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> QueryResult<T> {
    fn pending(enabled: bool) -> Self {
        Self {
            data: None,
            error: None,
            is_loading: enabled,
            is_fetching: false,
            is_refetching: false,
            updated_at: None,
        }
    }
}

struct EntryState<T> {
    data: Option<Arc<T>>,
    error: Option<FetchError>,
    updated_at: Option<Instant>,
    updated_wall: Option<DateTime<Utc>>,
    last_outcome: Option<Result<Arc<T>, FetchError>>,
    generation: u64,
    fetching: bool,
    invalidated: bool,
    observers: usize,
    last_used: Instant,
}

impl<T> EntryState<T> {
    fn new() -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
            updated_wall: None,
            last_outcome: None,
            generation: 0,
            fetching: false,
            invalidated: false,
            observers: 0,
            last_used: Instant::now(),
        }
    }

    fn fresh_data(&self, stale_time: Duration) -> Option<Arc<T>> {
        if self.invalidated {
            return None;
        }
        match (&self.data, self.updated_at) {
            (Some(data), Some(at)) if at.elapsed() < stale_time => Some(Arc::clone(data)),
            _ => None,
        }
    }

    fn mark_updated(&mut self) {
        self.updated_at = Some(Instant::now());
        self.updated_wall = Some(Utc::now());
        self.invalidated = false;
    }

    fn settle(&mut self, outcome: &Result<Arc<T>, FetchError>) {
        match outcome {
            Ok(data) => {
                self.data = Some(Arc::clone(data));
                self.error = None;
                self.mark_updated();
            }
            Err(error) => self.error = Some(error.clone()),
        }
        self.last_outcome = Some(outcome.clone());
        self.generation += 1;
        self.fetching = false;
        self.last_used = Instant::now();
    }
}

struct Entry<T> {
    state: Mutex<EntryState<T>>,
    // Held for the whole network round trip; at most one request per key.
    fetch_lock: AsyncMutex<()>,
}

impl<T> Entry<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(EntryState::new()),
            fetch_lock: AsyncMutex::new(()),
        }
    }

    fn state(&self) -> MutexGuard<'_, EntryState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory cache of one resource type, keyed by `QueryKey`.
pub struct QueryCache<T> {
    entries: Mutex<HashMap<QueryKey, Arc<Entry<T>>>>,
    options: QueryOptions,
}

impl<T> QueryCache<T> {
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Arc<Entry<T>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn entry(&self, key: &QueryKey) -> Arc<Entry<T>> {
        let mut entries = self.entries();
        Arc::clone(
            entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Entry::new())),
        )
    }

    fn existing(&self, key: &QueryKey) -> Option<Arc<Entry<T>>> {
        self.entries().get(key).cloned()
    }

    /// Register a live observer of `key`. Observed entries are never collected.
    pub fn attach(&self, key: &QueryKey) {
        let entry = self.entry(key);
        let mut state = entry.state();
        state.observers += 1;
        state.last_used = Instant::now();
    }

    /// Release an observer of `key`; the gc clock restarts from now.
    pub fn detach(&self, key: &QueryKey) {
        if let Some(entry) = self.existing(key) {
            let mut state = entry.state();
            state.observers = state.observers.saturating_sub(1);
            state.last_used = Instant::now();
        }
    }

    /// Number of live observers of `key`.
    pub fn observers(&self, key: &QueryKey) -> usize {
        self.existing(key).map_or(0, |entry| entry.state().observers)
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            options,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create the entry for `key` if missing and mark it observed.
    pub fn touch(&self, key: &QueryKey) {
        self.entry(key).state().last_used = Instant::now();
    }

    /// Cached data for `key`, fresh or not.
    pub fn peek(&self, key: &QueryKey) -> Option<Arc<T>> {
        self.existing(key)?.state().data.clone()
    }

    /// Whether `key` holds data younger than the stale time.
    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.existing(key)
            .is_some_and(|entry| entry.state().fresh_data(self.options.stale_time).is_some())
    }

    /// Current state of `key`. A disabled query never reports loading.
    pub fn snapshot(&self, key: &QueryKey, enabled: bool) -> QueryResult<T> {
        let Some(entry) = self.existing(key) else {
            return QueryResult::pending(enabled);
        };

        let mut state = entry.state();
        state.last_used = Instant::now();

        let settled = state.data.is_some() || state.error.is_some();
        QueryResult {
            data: state.data.clone(),
            error: state.error.clone(),
            is_loading: enabled && !settled,
            is_fetching: state.fetching,
            is_refetching: state.fetching && settled,
            updated_at: state.updated_wall,
        }
    }

    /// Flag `key` as fetching ahead of a spawned request.
    pub fn mark_fetching(&self, key: &QueryKey) {
        self.entry(key).state().fetching = true;
    }

    /// Store an initial value for an entry that has no data yet.
    ///
    /// The seed counts as a success at seeding time, so it stays fresh for
    /// the stale time and replaces any earlier failure. Returns false when
    /// the entry already had data.
    pub fn seed(&self, key: &QueryKey, value: T) -> bool {
        let entry = self.entry(key);
        let mut state = entry.state();
        if state.data.is_some() {
            return false;
        }
        state.data = Some(Arc::new(value));
        state.error = None;
        state.mark_updated();
        state.last_used = Instant::now();
        true
    }

    /// Mark every entry stale so the next mount refetches.
    pub fn invalidate_all(&self) {
        for entry in self.entries().values() {
            entry.state().invalidated = true;
        }
    }

    /// Drop entries with no observers that have been idle longer than the gc time.
    pub fn collect_garbage(&self) -> usize {
        let gc_time = self.options.gc_time;
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| {
            let state = entry.state();
            state.observers > 0 || state.fetching || state.last_used.elapsed() < gc_time
        });
        before - entries.len()
    }

    /// Resolve `key`, from the cache when allowed and fresh, else via `query_fn`.
    ///
    /// Callers that arrive while a request for the same key is in flight wait
    /// for it and receive its outcome instead of issuing their own.
    pub async fn fetch<F, Fut>(
        &self,
        key: &QueryKey,
        policy: FetchPolicy,
        query_fn: F,
    ) -> Result<Arc<T>, FetchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let entry = self.entry(key);

        let seen = {
            let mut state = entry.state();
            state.last_used = Instant::now();
            if policy == FetchPolicy::CacheFirst {
                if let Some(data) = state.fresh_data(self.options.stale_time) {
                    tracing::debug!(%key, "cache hit");
                    return Ok(data);
                }
            }
            state.fetching = true;
            state.generation
        };

        let _in_flight = entry.fetch_lock.lock().await;

        {
            let state = entry.state();
            if state.generation != seen {
                if let Some(outcome) = state.last_outcome.clone() {
                    tracing::debug!(%key, "joined in-flight request");
                    return outcome;
                }
            }
        }

        tracing::debug!(%key, ?policy, "fetching");
        let outcome = self.run_with_retry(key, &query_fn).await;
        entry.state().settle(&outcome);

        match &outcome {
            Ok(_) => tracing::debug!(%key, "fetch settled"),
            Err(error) => tracing::warn!(%key, error = %error, "fetch failed"),
        }
        outcome
    }

    async fn run_with_retry<F, Fut>(
        &self,
        key: &QueryKey,
        query_fn: &F,
    ) -> Result<Arc<T>, FetchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 0;
        loop {
            match query_fn().await {
                Ok(value) => return Ok(Arc::new(value)),
                Err(error) if attempt < self.options.retry => {
                    let delay = QueryOptions::retry_delay(attempt);
                    tracing::debug!(%key, attempt = attempt + 1, ?delay, error = %error, "retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
