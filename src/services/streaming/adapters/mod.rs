//! Frame Adapters
//!
//! One adapter per wire framing. Both decode the same `StreamEvent` JSON;
//! they differ only in how that JSON is delimited on the wire.

pub mod json_frame;
pub mod sse;

pub use json_frame::JsonFrameAdapter;
pub use sse::SseLineAdapter;

use ragio_core::streaming::{FrameError, StreamEvent};

/// Decode one JSON-encoded `StreamEvent`.
pub(crate) fn decode_event(payload: &str) -> Result<StreamEvent, FrameError> {
    serde_json::from_str(payload).map_err(|e| FrameError::from_json_error(payload, e))
}
