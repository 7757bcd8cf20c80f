//! Streaming Service
//!
//! Delivers an incrementally generated chat response to a caller through
//! `StreamCallbacks`, over SSE or WebSocket, with bounded reconnects on the
//! WebSocket path and a rolling buffer of recent events.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::{Stream, StreamExt};

use ragio_core::credentials::CredentialProvider;
use ragio_core::request::StreamRequest;
use ragio_core::streaming::{StreamAdapter, StreamEvent, TransportKind};

use super::backoff::ReconnectPolicy;
use super::buffer::{BufferedEvent, EventBuffer, DEFAULT_RECENT_COUNT};
use super::callbacks::StreamCallbacks;
use super::session::{SessionHandle, SessionSlot, SessionState};
use super::{sse, websocket};
use crate::models::settings::{ClientConfig, StreamingConfig};
use crate::services::http_client::build_http_client;
use crate::utils::error::{AppError, AppResult};

/// How one transport run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionEnd {
    /// The caller has been told the outcome; nothing more will fire
    Finished,
    /// Transport went away without a terminal event
    Dropped,
    /// `close()` or a newer session took over
    Cancelled,
}

/// Outcome of handing one raw frame to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dispatch {
    Continue,
    Completed,
    Failed,
    Cancelled,
}

/// Next item from a transport, or why there is none.
pub(crate) enum Next<T> {
    Item(T),
    End,
    Cancelled,
    IdleTimeout(Duration),
}

pub(crate) fn idle_timeout_message(limit: Duration) -> String {
    format!("Stream idle timeout after {:?}", limit)
}

/// Poison-tolerant lock; every critical section here is a plain field update.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct ServiceInner {
    api_base: String,
    client: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
    idle_timeout: Option<Duration>,
    buffer: Mutex<EventBuffer>,
    reconnect: Mutex<ReconnectPolicy>,
    session: Mutex<SessionSlot>,
}

/// Streaming client for the chat backend.
///
/// Cloning yields another handle to the same instance, so a stream can be
/// driven on a spawned task while another task calls [`close`] or reads
/// the buffer.
///
/// [`close`]: StreamingService::close
#[derive(Clone)]
pub struct StreamingService {
    inner: Arc<ServiceInner>,
}

impl StreamingService {
    /// Create a service from client configuration.
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialProvider>) -> AppResult<Self> {
        config.validate().map_err(AppError::validation)?;
        let client = build_http_client(&config.streaming)?;
        Ok(Self::with_client(
            &config.api_base,
            &config.streaming,
            client,
            credentials,
        ))
    }

    /// Create a service around an existing HTTP client.
    pub fn with_client(
        api_base: impl Into<String>,
        streaming: &StreamingConfig,
        client: reqwest::Client,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                api_base: api_base.into(),
                client,
                credentials,
                idle_timeout: streaming.idle_timeout(),
                buffer: Mutex::new(EventBuffer::new(streaming.buffer_capacity)),
                reconnect: Mutex::new(streaming.reconnect_policy()),
                session: Mutex::new(SessionSlot::new()),
            }),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.inner.api_base
    }

    /// Stream over SSE. Resolves once the session is over; never retries.
    pub async fn start_sse_stream(
        &self,
        request: &StreamRequest,
        callbacks: Arc<dyn StreamCallbacks>,
    ) {
        self.start_stream(TransportKind::Sse, request, callbacks).await
    }

    /// Stream over WebSocket. Resolves once the session is over, which
    /// includes any reconnect attempts.
    pub async fn start_websocket_stream(
        &self,
        request: &StreamRequest,
        callbacks: Arc<dyn StreamCallbacks>,
    ) {
        self.start_stream(TransportKind::WebSocket, request, callbacks)
            .await
    }

    /// Stream over `kind`.
    ///
    /// Every failure is reported through `callbacks`. A dropped transport is
    /// re-run with the same kind, request and callbacks after the reconnect
    /// delay; only WebSocket runs ever report a drop.
    pub async fn start_stream(
        &self,
        kind: TransportKind,
        request: &StreamRequest,
        callbacks: Arc<dyn StreamCallbacks>,
    ) {
        let session = lock(&self.inner.session).open(kind);
        self.reset_reconnect_attempts();
        tracing::info!("Starting {} stream (session {})", kind, session.id());

        loop {
            let end = match kind {
                TransportKind::Sse => sse::run(self, &session, request, callbacks.as_ref()).await,
                TransportKind::WebSocket => {
                    websocket::run(self, &session, request, callbacks.as_ref()).await
                }
            };

            match end {
                SessionEnd::Finished => {
                    lock(&self.inner.session).release(&session);
                    tracing::debug!("{} session {} finished", kind, session.id());
                    return;
                }
                SessionEnd::Cancelled => {
                    tracing::debug!("{} session {} cancelled", kind, session.id());
                    return;
                }
                SessionEnd::Dropped if session.is_cancelled() => return,
                SessionEnd::Dropped => {
                    let (delay, attempt, max) = {
                        let mut policy = lock(&self.inner.reconnect);
                        let delay = policy.next_delay();
                        (delay, policy.attempts(), policy.max_attempts())
                    };
                    let Some(delay) = delay else {
                        tracing::warn!(
                            "{} session {} closed; giving up after {} reconnect attempts",
                            kind,
                            session.id(),
                            max
                        );
                        lock(&self.inner.session).release(&session);
                        return;
                    };

                    tracing::info!(
                        "{} session {} closed; reconnecting in {:?} (attempt {}/{})",
                        kind,
                        session.id(),
                        delay,
                        attempt,
                        max
                    );
                    lock(&self.inner.session).set_reconnecting(&session, true);
                    tokio::select! {
                        biased;
                        _ = session.cancelled() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                    lock(&self.inner.session).set_reconnecting(&session, false);
                }
            }
        }
    }

    /// The last `n` buffered events, oldest first.
    pub fn recent_buffer(&self, n: usize) -> Vec<BufferedEvent> {
        lock(&self.inner.buffer).recent(n)
    }

    /// The last ten buffered events, oldest first.
    pub fn recent_buffer_default(&self) -> Vec<BufferedEvent> {
        self.recent_buffer(DEFAULT_RECENT_COUNT)
    }

    pub fn buffer_len(&self) -> usize {
        lock(&self.inner.buffer).len()
    }

    pub fn clear_buffer(&self) {
        lock(&self.inner.buffer).clear();
    }

    /// Tear down the active session, if any, and reset the reconnect
    /// counter. Safe to call repeatedly.
    pub fn close(&self) {
        let closed = lock(&self.inner.session).close();
        lock(&self.inner.reconnect).reset();
        if closed {
            tracing::info!("Streaming session closed");
        }
    }

    pub fn state(&self) -> SessionState {
        lock(&self.inner.session).state()
    }

    pub fn is_active(&self) -> bool {
        lock(&self.inner.session).is_active()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        lock(&self.inner.reconnect).attempts()
    }

    // ── Transport support ─────────────────────────────────────────────

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.inner.client
    }

    pub(crate) fn bearer_token(&self) -> Option<String> {
        self.inner.credentials.bearer_token()
    }

    pub(crate) fn reset_reconnect_attempts(&self) {
        lock(&self.inner.reconnect).reset();
    }

    #[cfg(test)]
    pub(crate) fn open_session(&self, kind: TransportKind) -> SessionHandle {
        lock(&self.inner.session).open(kind)
    }

    /// Await the next item, giving up on cancellation or idle timeout.
    pub(crate) async fn next_frame<S>(&self, session: &SessionHandle, stream: &mut S) -> Next<S::Item>
    where
        S: Stream + Unpin,
    {
        let idle_timeout = self.inner.idle_timeout;
        let read = async {
            match idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, stream.next()).await {
                    Ok(Some(item)) => Next::Item(item),
                    Ok(None) => Next::End,
                    Err(_) => Next::IdleTimeout(limit),
                },
                None => match stream.next().await {
                    Some(item) => Next::Item(item),
                    None => Next::End,
                },
            }
        };

        tokio::select! {
            biased;
            _ = session.cancelled() => Next::Cancelled,
            next = read => next,
        }
    }

    /// Decode one raw frame, buffer the event, and fire its callback.
    pub(crate) fn handle_frame(
        &self,
        session: &SessionHandle,
        adapter: &mut dyn StreamAdapter,
        input: &str,
        callbacks: &dyn StreamCallbacks,
    ) -> Dispatch {
        let event = match adapter.adapt(input) {
            Ok(Some(event)) => event,
            Ok(None) => return Dispatch::Continue,
            Err(e) => {
                tracing::debug!("Dropping {} frame: {}", adapter.transport(), e);
                return Dispatch::Continue;
            }
        };

        if session.is_cancelled() {
            return Dispatch::Cancelled;
        }
        lock(&self.inner.buffer).push(event.clone());

        match event {
            StreamEvent::Content(fragment) => {
                callbacks.on_content(&fragment);
                Dispatch::Continue
            }
            StreamEvent::Done(final_text) => {
                callbacks.on_complete(&final_text);
                Dispatch::Completed
            }
            StreamEvent::Error(message) => {
                tracing::warn!("Server reported stream error: {}", message);
                callbacks.on_error(&message);
                Dispatch::Failed
            }
        }
    }

    /// Fire `on_error` unless the session has been torn down.
    pub(crate) fn report_error(
        &self,
        session: &SessionHandle,
        callbacks: &dyn StreamCallbacks,
        message: &str,
    ) {
        if !session.is_cancelled() {
            callbacks.on_error(message);
        }
    }

    /// Fire `on_complete` unless the session has been torn down.
    pub(crate) fn report_complete(
        &self,
        session: &SessionHandle,
        callbacks: &dyn StreamCallbacks,
        final_text: &str,
    ) {
        if !session.is_cancelled() {
            callbacks.on_complete(final_text);
        }
    }
}

impl std::fmt::Debug for StreamingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingService")
            .field("api_base", &self.inner.api_base)
            .field("state", &self.state())
            .field("buffered", &self.buffer_len())
            .finish()
    }
}
