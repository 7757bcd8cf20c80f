//! Error Handling
//!
//! Unified error types for the client crate.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use ragio_core::CoreError;

/// Client-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP transport errors (connect, read, client construction)
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the streaming endpoint
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    /// WebSocket transport errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// URL parse errors
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Errors from the core crate
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for client errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a WebSocket error
    pub fn websocket(msg: impl Into<String>) -> Self {
        Self::WebSocket(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for AppError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(err.to_string())
    }
}

impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
