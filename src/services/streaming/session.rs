//! Transport Session
//!
//! At most one transport session is live per streaming service. The slot
//! records which transport is driving callbacks and owns the cancellation
//! token used to tear it down.

use tokio_util::sync::CancellationToken;

use ragio_core::streaming::TransportKind;

/// Observable lifecycle state of a streaming service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming(TransportKind),
    Reconnecting(TransportKind),
}

/// Handle held by the task driving a session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: u64,
    kind: TransportKind,
    cancel: CancellationToken,
}

impl SessionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// True once `close()` or a newer session has replaced this one.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves when the session is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

#[derive(Debug)]
struct TransportSession {
    handle: SessionHandle,
    reconnecting: bool,
}

/// Single-occupancy session slot.
#[derive(Debug, Default)]
pub struct SessionSlot {
    active: Option<TransportSession>,
    next_id: u64,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new session, cancelling whichever one was active.
    pub fn open(&mut self, kind: TransportKind) -> SessionHandle {
        if let Some(previous) = self.active.take() {
            tracing::debug!(
                "Replacing {} session {} with a new {} session",
                previous.handle.kind,
                previous.handle.id,
                kind
            );
            previous.handle.cancel.cancel();
        }
        self.next_id += 1;
        let handle = SessionHandle {
            id: self.next_id,
            kind,
            cancel: CancellationToken::new(),
        };
        self.active = Some(TransportSession {
            handle: handle.clone(),
            reconnecting: false,
        });
        handle
    }

    /// Cancel and clear the active session. Returns whether one existed.
    pub fn close(&mut self) -> bool {
        match self.active.take() {
            Some(session) => {
                session.handle.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Clear the slot if `handle` still owns it.
    pub fn release(&mut self, handle: &SessionHandle) {
        if self.owns(handle) {
            self.active = None;
        }
    }

    pub fn set_reconnecting(&mut self, handle: &SessionHandle, reconnecting: bool) {
        if let Some(session) = self.active.as_mut() {
            if session.handle.id == handle.id {
                session.reconnecting = reconnecting;
            }
        }
    }

    pub fn owns(&self, handle: &SessionHandle) -> bool {
        self.active
            .as_ref()
            .is_some_and(|s| s.handle.id == handle.id)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn state(&self) -> SessionState {
        match &self.active {
            None => SessionState::Idle,
            Some(s) if s.reconnecting => SessionState::Reconnecting(s.handle.kind),
            Some(s) => SessionState::Streaming(s.handle.kind),
        }
    }
}
