// Query client and observers for the feed and detail views.
// Owns the post caches and binds each view to one cache key.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::task::JoinHandle;

use crate::api::{Post, PostSource};
use crate::error::FetchError;

use super::store::{FetchPolicy, QueryCache, QueryKey, QueryOptions, QueryResult};

type QueryFn<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, FetchError>> + Send + Sync>;

/// Root of all cached post data.
///
/// Built once by the application entry point and shared by `Arc` with every
/// view for the lifetime of the process. Nothing is global.
pub struct QueryClient {
    source: Arc<dyn PostSource>,
    posts: Arc<QueryCache<Vec<Post>>>,
    post: Arc<QueryCache<Post>>,
}

impl QueryClient {
    pub fn new(source: Arc<dyn PostSource>, options: QueryOptions) -> Self {
        Self {
            source,
            posts: Arc::new(QueryCache::new(options)),
            post: Arc::new(QueryCache::new(options)),
        }
    }

    /// Observer over the post collection.
    pub fn posts_query(&self) -> QueryObserver<Vec<Post>> {
        let source = Arc::clone(&self.source);
        let query_fn: QueryFn<Vec<Post>> = Arc::new(move || {
            let source = Arc::clone(&source);
            async move { source.fetch_posts().await }.boxed()
        });

        QueryObserver::new(Arc::clone(&self.posts), QueryKey::Posts, query_fn, true)
    }

    /// Observer over a single post.
    ///
    /// When the collection is already cached and contains `id`, that post
    /// seeds the entry so the view has data without a loading state. An
    /// empty `id` yields a disabled observer that never fetches.
    pub fn post_query(&self, id: &str) -> QueryObserver<Post> {
        let key = QueryKey::Post(id.to_string());
        let enabled = !id.is_empty();

        if enabled {
            let list = self.posts.peek(&QueryKey::Posts);
            if let Some(post) = seed_post(list.as_deref().map(Vec::as_slice), id) {
                if self.post.seed(&key, post) {
                    tracing::debug!(id, "seeded post from collection cache");
                }
            }
        }

        let source = Arc::clone(&self.source);
        let post_id = id.to_string();
        let query_fn: QueryFn<Post> = Arc::new(move || {
            let source = Arc::clone(&source);
            let post_id = post_id.clone();
            async move { source.fetch_post(&post_id).await }.boxed()
        });

        QueryObserver::new(Arc::clone(&self.post), key, query_fn, enabled)
    }

    /// Mark everything stale; the next mount of each view refetches.
    pub fn invalidate(&self) {
        self.posts.invalidate_all();
        self.post.invalidate_all();
    }

    /// Drop idle entries from both caches.
    pub fn collect_garbage(&self) -> usize {
        self.posts.collect_garbage() + self.post.collect_garbage()
    }
}

/// Find the post whose identifier matches `id` in a cached collection.
pub fn seed_post(list: Option<&[Post]>, id: &str) -> Option<Post> {
    list?.iter().find(|post| post.route_id() == id).cloned()
}

/// One view's handle on one cache entry.
pub struct QueryObserver<T> {
    cache: Arc<QueryCache<T>>,
    key: QueryKey,
    query_fn: QueryFn<T>,
    enabled: bool,
}

impl<T> QueryObserver<T> {
    fn new(cache: Arc<QueryCache<T>>, key: QueryKey, query_fn: QueryFn<T>, enabled: bool) -> Self {
        cache.attach(&key);
        Self {
            cache,
            key,
            query_fn,
            enabled,
        }
    }
}

impl<T> Drop for QueryObserver<T> {
    fn drop(&mut self) {
        self.cache.detach(&self.key);
    }
}

impl<T: Send + Sync + 'static> QueryObserver<T> {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start loading unless the entry is fresh. Returns the spawned fetch, if any.
    pub fn mount(&self) -> Option<JoinHandle<Result<Arc<T>, FetchError>>> {
        if !self.enabled {
            return None;
        }

        self.cache.touch(&self.key);
        if self.cache.is_fresh(&self.key) {
            tracing::debug!(key = %self.key, "mounted on fresh data");
            return None;
        }
        Some(self.spawn(FetchPolicy::CacheFirst))
    }

    /// Fetch again regardless of freshness, keeping current data visible.
    pub fn refetch(&self) -> Option<JoinHandle<Result<Arc<T>, FetchError>>> {
        if !self.enabled {
            return None;
        }

        self.cache.mark_fetching(&self.key);
        Some(self.spawn(FetchPolicy::Network))
    }

    pub fn snapshot(&self) -> QueryResult<T> {
        self.cache.snapshot(&self.key, self.enabled)
    }

    fn spawn(&self, policy: FetchPolicy) -> JoinHandle<Result<Arc<T>, FetchError>> {
        let cache = Arc::clone(&self.cache);
        let key = self.key.clone();
        let query_fn = Arc::clone(&self.query_fn);

        tokio::spawn(async move { cache.fetch(&key, policy, || query_fn()).await })
    }
}
