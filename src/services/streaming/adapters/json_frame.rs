//! JSON Frame Adapter
//!
//! Handles WebSocket text frames, each holding exactly one event.

use ragio_core::streaming::{FrameError, StreamAdapter, StreamEvent, TransportKind};

use super::decode_event;

/// Adapter for whole-frame JSON messages.
#[derive(Debug, Default)]
pub struct JsonFrameAdapter;

impl JsonFrameAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl StreamAdapter for JsonFrameAdapter {
    fn transport(&self) -> TransportKind {
        TransportKind::WebSocket
    }

    fn adapt(&mut self, input: &str) -> Result<Option<StreamEvent>, FrameError> {
        decode_event(input.trim()).map(Some)
    }
}
