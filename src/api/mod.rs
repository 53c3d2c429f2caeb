// Posts API module.
// Provides the HTTP client, the post type, and the source trait the cache fetches through.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{DEFAULT_BASE_URL, PostsClient};
pub use endpoints::PostSource;
pub use types::Post;
