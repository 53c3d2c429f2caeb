// Posts API endpoint functions.
// Fetch the collection or a single post, logging every failure before returning it.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::logger::LogContext;

use super::client::PostsClient;
use super::types::Post;

/// Anything the query cache can load posts from.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(&self) -> Result<Vec<Post>, FetchError>;

    async fn fetch_post(&self, id: &str) -> Result<Post, FetchError>;
}

impl PostsClient {
    async fn get_posts(&self, url: &str) -> Result<Vec<Post>, FetchError> {
        let response = self.get(url).await?;
        let posts: Vec<Post> = response.json().await?;
        Ok(posts)
    }

    async fn get_post(&self, url: &str) -> Result<Post, FetchError> {
        let response = self.get(url).await?;
        let post: Post = response.json().await?;
        Ok(post)
    }
}

#[async_trait]
impl PostSource for PostsClient {
    /// Get every post, in server order.
    async fn fetch_posts(&self) -> Result<Vec<Post>, FetchError> {
        let url = self.url("/posts");
        let result = self.get_posts(&url).await;

        if let Err(error) = &result {
            self.sink()
                .log(error, &LogContext::new("fetchPosts").with("url", url));
        }
        result
    }

    /// Get a single post by identifier.
    async fn fetch_post(&self, id: &str) -> Result<Post, FetchError> {
        let result = if id.is_empty() {
            Err(FetchError::transport("post id is required"))
        } else {
            self.get_post(&self.url(&format!("/posts/{}", id))).await
        };

        if let Err(error) = &result {
            self.sink()
                .log(error, &LogContext::new("fetchPost").with("id", id));
        }
        result
    }
}
