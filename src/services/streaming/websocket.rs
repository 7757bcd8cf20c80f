//! WebSocket Transport
//!
//! Connects to the chat socket, sends the request as the first text frame,
//! then treats every text frame as a JSON stream event. A connection that
//! drops without a terminal event is reported to the caller as
//! `SessionEnd::Dropped` so the service can reconnect.

use futures_util::SinkExt;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use ragio_core::request::StreamRequest;
use ragio_core::streaming::{StreamAdapter, TransportKind};

use super::callbacks::StreamCallbacks;
use super::endpoints::websocket_url;
use super::factory::AdapterFactory;
use super::service::{idle_timeout_message, Dispatch, Next, SessionEnd, StreamingService};
use super::session::SessionHandle;
use crate::utils::error::{AppError, AppResult};

/// Message passed to `on_error` for any socket-level failure.
pub const WEBSOCKET_ERROR_MESSAGE: &str = "WebSocket connection error";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// First frame of a session: the request fields plus the bearer token.
#[derive(Serialize)]
struct Handshake<'a> {
    #[serde(flatten)]
    request: &'a StreamRequest,
    token: Option<String>,
}

pub(crate) fn handshake_frame(request: &StreamRequest, token: Option<String>) -> AppResult<String> {
    Ok(serde_json::to_string(&Handshake { request, token })?)
}

pub(super) async fn run(
    service: &StreamingService,
    session: &SessionHandle,
    request: &StreamRequest,
    callbacks: &dyn StreamCallbacks,
) -> SessionEnd {
    let url = match websocket_url(service.api_base()) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("Cannot build WebSocket URL: {}", e);
            service.report_error(session, callbacks, &e.to_string());
            return SessionEnd::Finished;
        }
    };

    tracing::debug!("Connecting to {} (session {})", url, session.id());
    let connected = tokio::select! {
        biased;
        _ = session.cancelled() => return SessionEnd::Cancelled,
        connected = connect_async(url.as_str()) => connected,
    };
    let mut socket = match connected {
        Ok((socket, _response)) => socket,
        Err(e) => {
            tracing::warn!("WebSocket connect to {} failed: {}", url, AppError::from(e));
            service.report_error(session, callbacks, WEBSOCKET_ERROR_MESSAGE);
            return SessionEnd::Dropped;
        }
    };

    service.reset_reconnect_attempts();
    tracing::info!("WebSocket stream opened (session {})", session.id());

    let frame = match handshake_frame(request, service.bearer_token()) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!("Failed to encode stream request: {}", e);
            service.report_error(session, callbacks, &e.to_string());
            close_quietly(&mut socket).await;
            return SessionEnd::Finished;
        }
    };
    if let Err(e) = socket.send(Message::Text(frame)).await {
        tracing::warn!("Failed to send stream request: {}", AppError::from(e));
        service.report_error(session, callbacks, WEBSOCKET_ERROR_MESSAGE);
        return SessionEnd::Dropped;
    }

    let mut adapter = AdapterFactory::create(TransportKind::WebSocket);
    loop {
        let text = match service.next_frame(session, &mut socket).await {
            Next::Item(Ok(Message::Text(text))) => text,
            Next::Item(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    tracing::debug!("Dropping non-UTF-8 binary frame");
                    continue;
                }
            },
            Next::Item(Ok(Message::Close(frame))) => {
                tracing::info!(
                    "WebSocket closed by server (session {}): {:?}",
                    session.id(),
                    frame
                );
                return SessionEnd::Dropped;
            }
            Next::Item(Ok(_)) => continue,
            Next::Item(Err(e)) => {
                tracing::warn!(
                    "WebSocket error (session {}): {}",
                    session.id(),
                    AppError::from(e)
                );
                service.report_error(session, callbacks, WEBSOCKET_ERROR_MESSAGE);
                return SessionEnd::Dropped;
            }
            Next::End => {
                tracing::info!("WebSocket ended (session {})", session.id());
                return SessionEnd::Dropped;
            }
            Next::Cancelled => {
                close_quietly(&mut socket).await;
                return SessionEnd::Cancelled;
            }
            Next::IdleTimeout(limit) => {
                let message = idle_timeout_message(limit);
                tracing::warn!("{} (session {})", message, session.id());
                service.report_error(session, callbacks, &message);
                close_quietly(&mut socket).await;
                return SessionEnd::Finished;
            }
        };

        if let Some(end) = dispatch_text(service, session, adapter.as_mut(), &text, callbacks) {
            close_quietly(&mut socket).await;
            return end;
        }
    }
}

fn dispatch_text(
    service: &StreamingService,
    session: &SessionHandle,
    adapter: &mut dyn StreamAdapter,
    text: &str,
    callbacks: &dyn StreamCallbacks,
) -> Option<SessionEnd> {
    match service.handle_frame(session, adapter, text, callbacks) {
        Dispatch::Continue => None,
        Dispatch::Completed | Dispatch::Failed => Some(SessionEnd::Finished),
        Dispatch::Cancelled => Some(SessionEnd::Cancelled),
    }
}

async fn close_quietly(socket: &mut Socket) {
    if let Err(e) = socket.close(None).await {
        tracing::debug!("WebSocket close failed: {}", e);
    }
}
