//! Adapter Factory
//!
//! Creates the frame adapter for a transport.

use ragio_core::streaming::{StreamAdapter, TransportKind};

use super::adapters::{JsonFrameAdapter, SseLineAdapter};

/// Factory for creating frame adapters based on transport.
pub struct AdapterFactory;

impl AdapterFactory {
    /// Create the adapter that decodes frames of the given transport.
    pub fn create(kind: TransportKind) -> Box<dyn StreamAdapter> {
        match kind {
            TransportKind::Sse => Box::new(SseLineAdapter::new()),
            TransportKind::WebSocket => Box::new(JsonFrameAdapter::new()),
        }
    }
}
