//! Error types for memwrap

use thiserror::Error;

/// Result type alias for memwrap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in memwrap
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid user identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Memory store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Stream iteration error: {0}")]
    StreamIteration(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn completion(msg: impl Into<String>) -> Self {
        Self::Completion(msg.into())
    }

    pub fn stream_iteration(msg: impl Into<String>) -> Self {
        Self::StreamIteration(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
