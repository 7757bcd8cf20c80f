//! Core Error Types
//!
//! Error types shared by the RAG.io client workspace. Kept to thiserror +
//! serde_json so the core crate stays lightweight; the client crate wraps
//! these in its own `AppError`.

use thiserror::Error;

/// Core error type for the RAG.io workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A request or value failed a constraint check
    #[error("Validation error: {0}")]
    Validation(String),

    /// A string could not be parsed into a typed value
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
