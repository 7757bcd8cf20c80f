//! Event Buffer
//!
//! Fixed-capacity ring of the most recent decoded events, kept for
//! diagnostics. Oldest entries are evicted first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use ragio_core::streaming::StreamEvent;

/// Default number of events retained.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

/// Default slice size for `recent` lookups.
pub const DEFAULT_RECENT_COUNT: usize = 10;

/// A decoded event and the moment it was captured.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BufferedEvent {
    pub event: StreamEvent,
    pub captured_at: DateTime<Utc>,
}

/// FIFO ring of buffered events.
#[derive(Debug, Clone)]
pub struct EventBuffer {
    entries: VecDeque<BufferedEvent>,
    capacity: usize,
}

impl EventBuffer {
    /// Create a buffer holding at most `capacity` events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an event stamped with the current time.
    pub fn push(&mut self, event: StreamEvent) {
        self.push_at(event, Utc::now());
    }

    fn push_at(&mut self, event: StreamEvent, captured_at: DateTime<Utc>) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(BufferedEvent { event, captured_at });
    }

    /// The last `n` events, oldest first. Returns fewer if fewer are held.
    pub fn recent(&self, n: usize) -> Vec<BufferedEvent> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}
