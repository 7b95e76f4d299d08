//! Error types for the agent service client

use thiserror::Error;

/// Result type for agent service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the agent service
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered with a non-success status
    #[error("Agent service error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Endpoint URL could not be built
    #[error("Invalid endpoint: {0}")]
    Url(String),

    /// The run reached a state we cannot continue from
    #[error("Run error: {0}")]
    Run(String),
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Url(err.to_string())
    }
}
