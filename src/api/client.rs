// Posts API HTTP client.
// Handles base URL joining, default headers, and status checking.

use std::sync::Arc;

use reqwest::{
    Client, Response,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{FeedError, FetchError, Result};
use crate::logger::{LogSink, TracingSink};

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// HTTP client for the posts endpoint.
#[derive(Clone)]
pub struct PostsClient {
    client: Client,
    base_url: String,
    sink: Arc<dyn LogSink>,
}

impl PostsClient {
    /// Create a client against `base_url` that reports failures to `sink`.
    pub fn new(base_url: &str, sink: Arc<dyn LogSink>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("feedview/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(FeedError::Api)?;

        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(FeedError::Config("base URL is empty".to_string()));
        }

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            sink,
        })
    }

    /// Create a client that logs through `tracing`.
    pub fn with_tracing(base_url: &str) -> Result<Self> {
        Self::new(base_url, Arc::new(TracingSink))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn sink(&self) -> &dyn LogSink {
        self.sink.as_ref()
    }

    /// Absolute URL for an endpoint path such as `/posts`.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Make a GET request to an absolute URL.
    pub async fn get(&self, url: &str) -> std::result::Result<Response, FetchError> {
        tracing::debug!(url, "GET");
        let response = self.client.get(url).send().await?;
        check_response(response)
    }
}

/// Reject anything outside the 2xx range, whatever the body says.
fn check_response(response: Response) -> std::result::Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status {
            status: status.as_u16(),
        })
    }
}
