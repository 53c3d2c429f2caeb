// Error types for feedview.
// Splits fetch failures (shared between cache waiters) from application errors.

use thiserror::Error;

/// Failure of a single fetch against the posts API.
///
/// Cloneable so that every caller waiting on the same in-flight request
/// receives the same error value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered outside the 2xx range.
    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    /// Network failure, malformed body, or a request that could not be built.
    #[error("{0}")]
    Transport(String),
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        FetchError::Transport(message.into())
    }

    /// Message shown to the user; empty when the failure carried no text.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if !status.is_success() => FetchError::Status {
                status: status.as_u16(),
            },
            _ => FetchError::Transport(err.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP client error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;
