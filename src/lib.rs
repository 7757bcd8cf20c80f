//! RAG.io Streaming Client Library
//!
//! Streams chat responses from a RAG.io backend to a caller-supplied set of
//! callbacks. It includes:
//! - The streaming service (SSE and WebSocket transports, reconnects, buffer)
//! - Client configuration and persisted auth state
//! - Logging setup and utilities

pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export commonly used items
pub use models::settings::{ClientConfig, ConfigOverrides, LogFormat, LoggingConfig, StreamingConfig};
pub use ragio_core::{
    CoreError, CredentialProvider, StaticToken, StreamEvent, StreamRequest, TransportKind,
};
pub use services::streaming::{
    BufferedEvent, CallbackEvent, ChannelCallbacks, FnCallbacks, SessionState, StreamCallbacks,
    StreamingService,
};
pub use storage::{config::ConfigService, credentials::FileTokenStore};
pub use utils::error::{AppError, AppResult};
