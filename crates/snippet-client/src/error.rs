//! Error types for the snippet API client

use reqwest::StatusCode;
use snippet_core::SnippetError;
use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Content cannot be empty")]
    EmptyContent,

    #[error("Invalid expiry: {0}")]
    InvalidExpiry(String),

    #[error("Invalid share link: {0}")]
    InvalidLink(String),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("{0}")]
    Rejected(String),

    #[error("This snippet has expired, the view limit was reached, or it has been deleted")]
    Gone,

    #[error("Failed to retrieve snippet (HTTP {0}). It may not exist")]
    NotFound(StatusCode),

    #[error("Failed to delete snippet (HTTP {0}). The token may be invalid or the snippet is already gone")]
    DeleteFailed(StatusCode),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Crypto(#[from] SnippetError),
}

impl ClientError {
    /// Whether the snippet can no longer be retrieved
    ///
    /// Expired, view-limited, deleted and unknown snippets all answer true,
    /// so hosts can keep showing one "no longer available" message while
    /// still being able to tell the cases apart.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ClientError::Gone | ClientError::NotFound(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ClientError {
    fn from(e: tokio::task::JoinError) -> Self {
        ClientError::Task(e.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(e: url::ParseError) -> Self {
        ClientError::InvalidLink(e.to_string())
    }
}
