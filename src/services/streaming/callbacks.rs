//! Stream Callbacks
//!
//! The caller-facing sink for a stream: content fragments, a terminal error,
//! or a terminal completion.

use tokio::sync::mpsc;

/// Receiver of stream output.
///
/// Fragments arrive in server order. At most one of `on_complete` or
/// `on_error` ends a session, though the WebSocket path may report
/// `on_error` once per failed connection attempt while reconnecting.
pub trait StreamCallbacks: Send + Sync {
    fn on_content(&self, fragment: &str);
    fn on_error(&self, message: &str);
    fn on_complete(&self, final_text: &str);
}

type Callback = Box<dyn Fn(&str) + Send + Sync>;

/// Callbacks assembled from three closures.
pub struct FnCallbacks {
    on_content: Callback,
    on_error: Callback,
    on_complete: Callback,
}

impl FnCallbacks {
    pub fn new(
        on_content: impl Fn(&str) + Send + Sync + 'static,
        on_error: impl Fn(&str) + Send + Sync + 'static,
        on_complete: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_content: Box::new(on_content),
            on_error: Box::new(on_error),
            on_complete: Box::new(on_complete),
        }
    }
}

impl StreamCallbacks for FnCallbacks {
    fn on_content(&self, fragment: &str) {
        (self.on_content)(fragment)
    }

    fn on_error(&self, message: &str) {
        (self.on_error)(message)
    }

    fn on_complete(&self, final_text: &str) {
        (self.on_complete)(final_text)
    }
}

impl std::fmt::Debug for FnCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCallbacks").finish_non_exhaustive()
    }
}

/// A callback invocation, as forwarded by `ChannelCallbacks`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackEvent {
    Content(String),
    Error(String),
    Complete(String),
}

/// Forwards every callback onto an unbounded channel.
///
/// Sends after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelCallbacks {
    tx: mpsc::UnboundedSender<CallbackEvent>,
}

impl ChannelCallbacks {
    pub fn new(tx: mpsc::UnboundedSender<CallbackEvent>) -> Self {
        Self { tx }
    }

    /// Create callbacks together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CallbackEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl StreamCallbacks for ChannelCallbacks {
    fn on_content(&self, fragment: &str) {
        let _ = self.tx.send(CallbackEvent::Content(fragment.to_string()));
    }

    fn on_error(&self, message: &str) {
        let _ = self.tx.send(CallbackEvent::Error(message.to_string()));
    }

    fn on_complete(&self, final_text: &str) {
        let _ = self.tx.send(CallbackEvent::Complete(final_text.to_string()));
    }
}
