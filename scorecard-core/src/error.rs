//! Error types for the scorecard core

use thiserror::Error;

/// Result type alias for scorecard core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for scorecard core operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid repository reference
    #[error("Invalid repository: {0}")]
    InvalidRepository(String),

    /// Function tool error
    #[error("Tool error: {0}")]
    Tool(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
