//! Error types for the orchestration client

use thiserror::Error;

/// Errors raised while talking to the build orchestration service
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport level failure (connect, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The parent build's parameters are not a JSON object
    #[error("original build params are not a JSON object: {0}")]
    InvalidOriginalParams(String),

    /// Unknown build
    #[error("build not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err.to_string())
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
