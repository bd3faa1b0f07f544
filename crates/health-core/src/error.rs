//! Unified error handling for health-core

use thiserror::Error;

/// Core error type for health-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid export document: {0}")]
    Decode(String),

    #[error("Invalid timestamp '{value}': expected 'YYYY-MM-DD HH:MM:SS +ZZZZ'")]
    Timestamp { value: String },

    #[error("Invalid calendar date '{value}': expected 'YYYY-MM-DD'")]
    Date { value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for health-core
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }

    /// Create a timestamp error for the offending value
    pub fn timestamp(value: impl Into<String>) -> Self {
        Error::Timestamp {
            value: value.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Whether the caller sent something we could not read, as opposed to a
    /// failure on our side.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Decode(_))
    }
}

// Convert to String for boundary responses
impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
