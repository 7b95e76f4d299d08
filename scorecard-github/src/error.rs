//! Error types for GitHub fetch operations

use thiserror::Error;

/// Result type for GitHub fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching repository data
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A successful response whose payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Request URL could not be built
    #[error("Invalid URL: {0}")]
    Url(String),

    /// Core error (invalid repository, configuration)
    #[error(transparent)]
    Core(#[from] scorecard_core::Error),
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Url(err.to_string())
    }
}

impl From<Error> for scorecard_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Core(inner) => inner,
            other => scorecard_core::Error::Tool(other.to_string()),
        }
    }
}
