//! SSE Transport
//!
//! One POST per session. The response body is split into lines and each
//! `data: ` line carries a JSON stream event. Never reconnects.

use bytes::Bytes;
use futures_util::Stream;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use ragio_core::request::StreamRequest;
use ragio_core::streaming::{StreamAdapter, TransportKind};

use super::callbacks::StreamCallbacks;
use super::endpoints::{stream_url, STREAM_ID_HEADER};
use super::factory::AdapterFactory;
use super::service::{idle_timeout_message, Dispatch, Next, SessionEnd, StreamingService};
use super::session::SessionHandle;
use crate::utils::error::AppError;

/// Splits a byte stream into lines. Bytes are kept until a full line is
/// available so multi-byte characters split across chunks stay intact.
#[derive(Debug, Default)]
pub(crate) struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    /// Append a chunk and return every line it completed, without the
    /// trailing newline.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    /// Whatever is left once the body has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

pub(super) async fn run(
    service: &StreamingService,
    session: &SessionHandle,
    request: &StreamRequest,
    callbacks: &dyn StreamCallbacks,
) -> SessionEnd {
    let url = stream_url(service.api_base());

    let mut builder = service
        .http_client()
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "text/event-stream")
        .json(request);
    match service.bearer_token() {
        Some(token) => builder = builder.bearer_auth(token),
        None => tracing::debug!("No bearer token; sending SSE request without Authorization"),
    }

    tracing::debug!("POST {} (session {})", url, session.id());
    let sent = tokio::select! {
        biased;
        _ = session.cancelled() => return SessionEnd::Cancelled,
        sent = builder.send() => sent,
    };

    let response = match sent {
        Ok(response) => response,
        Err(e) => {
            let err = AppError::from(e);
            tracing::error!("SSE request to {} failed: {}", url, err);
            service.report_error(session, callbacks, &err.to_string());
            return SessionEnd::Finished;
        }
    };

    let status = response.status();
    if !status.is_success() {
        let err = AppError::HttpStatus(status.as_u16());
        tracing::warn!("SSE request to {} rejected: {}", url, err);
        service.report_error(session, callbacks, &err.to_string());
        return SessionEnd::Finished;
    }

    match response
        .headers()
        .get(STREAM_ID_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(stream_id) => tracing::info!(
            stream_id,
            "SSE stream opened (session {})",
            session.id()
        ),
        None => tracing::info!("SSE stream opened (session {})", session.id()),
    }

    consume_body(service, session, response.bytes_stream(), callbacks).await
}

/// Feed an SSE body through the line splitter and the SSE adapter until a
/// terminal event, a read error, or the end of the body.
pub(crate) async fn consume_body<S, E>(
    service: &StreamingService,
    session: &SessionHandle,
    body: S,
    callbacks: &dyn StreamCallbacks,
) -> SessionEnd
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let mut body = std::pin::pin!(body);
    let mut adapter = AdapterFactory::create(TransportKind::Sse);
    let mut lines = LineSplitter::default();

    loop {
        match service.next_frame(session, &mut body).await {
            Next::Item(Ok(chunk)) => {
                for line in lines.push(&chunk) {
                    if let Some(end) = dispatch_line(service, session, adapter.as_mut(), &line, callbacks) {
                        return end;
                    }
                }
            }
            Next::Item(Err(e)) => {
                tracing::error!("SSE read failed (session {}): {}", session.id(), e);
                service.report_error(session, callbacks, &e.to_string());
                return SessionEnd::Finished;
            }
            Next::End => {
                if let Some(line) = lines.finish() {
                    if let Some(end) = dispatch_line(service, session, adapter.as_mut(), &line, callbacks) {
                        return end;
                    }
                }
                tracing::debug!(
                    "SSE body ended without a terminal event (session {})",
                    session.id()
                );
                service.report_complete(session, callbacks, "");
                return SessionEnd::Finished;
            }
            Next::Cancelled => return SessionEnd::Cancelled,
            Next::IdleTimeout(limit) => {
                let message = idle_timeout_message(limit);
                tracing::warn!("{} (session {})", message, session.id());
                service.report_error(session, callbacks, &message);
                return SessionEnd::Finished;
            }
        }
    }
}

fn dispatch_line(
    service: &StreamingService,
    session: &SessionHandle,
    adapter: &mut dyn StreamAdapter,
    line: &str,
    callbacks: &dyn StreamCallbacks,
) -> Option<SessionEnd> {
    match service.handle_frame(session, adapter, line, callbacks) {
        Dispatch::Continue => None,
        Dispatch::Completed | Dispatch::Failed => Some(SessionEnd::Finished),
        Dispatch::Cancelled => Some(SessionEnd::Cancelled),
    }
}
