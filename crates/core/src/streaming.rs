//! Stream Event Types
//!
//! The minimal envelope the chat backend pushes over both transports, the
//! transport selector, and the adapter trait that turns raw wire input into
//! events. Shared between the client crate's transports and its tests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One server-to-client message.
///
/// Wire shape is `{"type": "content" | "done" | "error", "data": "<text>"}`.
/// Extra fields the backend attaches (such as `stream_id`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental text fragment
    Content(String),
    /// Terminal success; payload is the final text (may be empty)
    Done(String),
    /// Terminal failure reported by the server
    Error(String),
}

impl StreamEvent {
    /// Wire name of the variant.
    pub fn event_type(&self) -> &'static str {
        match self {
            StreamEvent::Content(_) => "content",
            StreamEvent::Done(_) => "done",
            StreamEvent::Error(_) => "error",
        }
    }

    /// Payload text.
    pub fn data(&self) -> &str {
        match self {
            StreamEvent::Content(data) | StreamEvent::Done(data) | StreamEvent::Error(data) => {
                data
            }
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Content(_))
    }
}

/// Wire transport used to deliver a stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Server-Sent Events over a POST response body
    Sse,
    /// WebSocket duplex connection
    WebSocket,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Sse => "sse",
            TransportKind::WebSocket => "websocket",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sse" | "http" => Ok(TransportKind::Sse),
            "websocket" | "ws" | "web_socket" => Ok(TransportKind::WebSocket),
            other => Err(CoreError::parse(format!("unknown transport: {}", other))),
        }
    }
}

/// Errors that can occur while decoding a frame.
///
/// These never reach stream callbacks; the transports log and drop them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FrameError {
    /// Payload is not valid JSON
    NotJson(String),
    /// Valid JSON that is not a `StreamEvent` (heartbeats, unknown types)
    InvalidEvent(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::NotJson(msg) => write!(f, "Malformed frame: {}", msg),
            FrameError::InvalidEvent(msg) => write!(f, "Unrecognized event: {}", msg),
        }
    }
}

impl std::error::Error for FrameError {}

impl FrameError {
    /// Classify a serde_json failure on `payload`.
    pub fn from_json_error(payload: &str, err: serde_json::Error) -> Self {
        if serde_json::from_str::<serde_json::Value>(payload).is_ok() {
            FrameError::InvalidEvent(err.to_string())
        } else {
            FrameError::NotJson(err.to_string())
        }
    }
}

/// Decodes raw transport input into stream events.
///
/// One adapter exists per framing: SSE lines and WebSocket text frames.
pub trait StreamAdapter: Send + Sync {
    /// Framing this adapter understands.
    fn transport(&self) -> TransportKind;

    /// Decode one raw input.
    ///
    /// Returns `Ok(None)` for input that carries no event by design
    /// (blank lines, `event:` lines, comments).
    fn adapt(&mut self, input: &str) -> Result<Option<StreamEvent>, FrameError>;

    /// Reset adapter state for a new stream.
    fn reset(&mut self) {}
}
