// Query module for in-memory request caching.
// Holds cached API responses with freshness tracking and exposes observers for the views.

pub mod hooks;
pub mod store;

pub use hooks::{QueryClient, QueryObserver, seed_post};
pub use store::{
    DEFAULT_GC_TIME, DEFAULT_RETRY, DEFAULT_STALE_TIME, FetchPolicy, QueryCache, QueryKey,
    QueryOptions, QueryResult,
};
