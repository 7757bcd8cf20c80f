//! Chat Response Streaming
//!
//! Delivers a chat response from the backend incrementally over one of two
//! transports:
//! - SSE: one POST whose body is a line-delimited `data: {json}` stream
//! - WebSocket: a request frame followed by one JSON event per text frame,
//!   with bounded exponential-backoff reconnects

pub mod adapters;
pub mod backoff;
pub mod buffer;
pub mod callbacks;
pub mod endpoints;
pub mod factory;
pub mod service;
pub mod session;
mod sse;
pub mod websocket;

// Re-export main types
pub use backoff::ReconnectPolicy;
pub use buffer::{BufferedEvent, EventBuffer};
pub use callbacks::{CallbackEvent, ChannelCallbacks, FnCallbacks, StreamCallbacks};
pub use factory::AdapterFactory;
pub use service::StreamingService;
pub use session::SessionState;
pub use websocket::WEBSOCKET_ERROR_MESSAGE;
