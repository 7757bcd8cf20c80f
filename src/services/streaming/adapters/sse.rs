//! SSE Line Adapter
//!
//! Handles `data: <json>` lines from the chat stream response body.

use ragio_core::streaming::{FrameError, StreamAdapter, StreamEvent, TransportKind};

use super::decode_event;

/// Prefix marking a line that carries an event payload.
pub const DATA_PREFIX: &str = "data: ";

/// Adapter for SSE-framed lines.
///
/// Only `data: ` lines carry events. `event:` lines, `id:` lines, comments
/// and blank separators decode to nothing.
#[derive(Debug, Default)]
pub struct SseLineAdapter;

impl SseLineAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl StreamAdapter for SseLineAdapter {
    fn transport(&self) -> TransportKind {
        TransportKind::Sse
    }

    fn adapt(&mut self, input: &str) -> Result<Option<StreamEvent>, FrameError> {
        let line = input.trim_end_matches('\r');
        match line.strip_prefix(DATA_PREFIX) {
            Some(payload) => decode_event(payload).map(Some),
            None => Ok(None),
        }
    }
}
