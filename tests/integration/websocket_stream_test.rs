//! WebSocket Stream Integration Tests
//!
//! Runs `start_websocket_stream` against an in-process tungstenite server,
//! including reconnect after a server-side close and reconnect exhaustion.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use ragio_client::services::streaming::WEBSOCKET_ERROR_MESSAGE;
use ragio_client::{CallbackEvent, ChannelCallbacks, SessionState, StreamRequest};

use crate::support::{
    content_frame, done_frame, drain, error_frame, service_for, spawn_dropping_server,
};

/// What the server does on each accepted connection, in order. The last
/// script repeats for any further connections.
#[derive(Clone)]
enum Script {
    /// Send these frames, then wait for the client to close
    Send(Vec<String>),
    /// Send these frames, then close from the server side
    SendThenClose(Vec<String>),
    /// Send these frames, then hold the connection open
    SendThenHang(Vec<String>),
}

struct WsServer {
    base: String,
    connections: Arc<AtomicUsize>,
    handshakes: mpsc::UnboundedReceiver<Value>,
}

async fn spawn_ws_server(scripts: Vec<Script>) -> WsServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let connections = Arc::new(AtomicUsize::new(0));
    let (handshake_tx, handshakes) = mpsc::unbounded_channel();

    let counter = connections.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let index = counter.fetch_add(1, Ordering::SeqCst);
            let script = scripts[index.min(scripts.len() - 1)].clone();
            let handshake_tx = handshake_tx.clone();

            tokio::spawn(async move {
                let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();
                if let Some(Ok(Message::Text(first))) = socket.next().await {
                    let _ = handshake_tx.send(serde_json::from_str::<Value>(&first).unwrap());
                }

                let (frames, then) = match script {
                    Script::Send(frames) => (frames, 0),
                    Script::SendThenClose(frames) => (frames, 1),
                    Script::SendThenHang(frames) => (frames, 2),
                };
                for frame in frames {
                    if socket.send(Message::Text(frame)).await.is_err() {
                        return;
                    }
                }
                match then {
                    1 => {
                        let _ = socket.close(None).await;
                    }
                    2 => tokio::time::sleep(Duration::from_secs(60)).await,
                    _ => {}
                }
                // Drain until the client goes away.
                while let Some(Ok(_)) = socket.next().await {}
            });
        }
    });

    WsServer {
        base,
        connections,
        handshakes,
    }
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_websocket_stream_delivers_fragments_then_done() {
    let mut server = spawn_ws_server(vec![Script::Send(vec![
        content_frame("Hel"),
        content_frame("lo"),
        done_frame("Hello"),
    ])])
    .await;
    let service = service_for(&server.base, Some("tok-ws"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    let request = StreamRequest::new("hi")
        .with_conversation("c1")
        .with_reasoning_mode("cot");
    service
        .start_websocket_stream(&request, Arc::new(callbacks))
        .await;

    assert_eq!(
        drain(&mut rx),
        vec![
            CallbackEvent::Content("Hel".to_string()),
            CallbackEvent::Content("lo".to_string()),
            CallbackEvent::Complete("Hello".to_string()),
        ]
    );
    assert_eq!(service.buffer_len(), 3);
    assert_eq!(service.state(), SessionState::Idle);

    let handshake = server.handshakes.recv().await.unwrap();
    assert_eq!(handshake["message"], "hi");
    assert_eq!(handshake["conversation_id"], "c1");
    assert_eq!(handshake["reasoning_mode"], "cot");
    assert_eq!(handshake["token"], "tok-ws");

    // done closes the socket without a reconnect
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.connections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_websocket_handshake_without_token() {
    let mut server = spawn_ws_server(vec![Script::Send(vec![done_frame("")])]).await;
    let service = service_for(&server.base, None);
    let (callbacks, _rx) = ChannelCallbacks::channel();

    service
        .start_websocket_stream(&StreamRequest::new("hi"), Arc::new(callbacks))
        .await;

    let handshake = server.handshakes.recv().await.unwrap();
    assert!(handshake["token"].is_null());
    assert!(handshake.as_object().unwrap().contains_key("token"));
}

// ============================================================================
// Errors and reconnects
// ============================================================================

#[tokio::test]
async fn test_websocket_error_event_does_not_reconnect() {
    let server = spawn_ws_server(vec![Script::Send(vec![
        content_frame("par"),
        error_frame("model unavailable"),
    ])])
    .await;
    let service = service_for(&server.base, Some("tok"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    service
        .start_websocket_stream(&StreamRequest::new("hi"), Arc::new(callbacks))
        .await;

    assert_eq!(
        drain(&mut rx),
        vec![
            CallbackEvent::Content("par".to_string()),
            CallbackEvent::Error("model unavailable".to_string()),
        ]
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.connections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_websocket_reconnects_after_server_close() {
    let mut server = spawn_ws_server(vec![
        Script::SendThenClose(vec![content_frame("A")]),
        Script::Send(vec![done_frame("AB")]),
    ])
    .await;
    let service = service_for(&server.base, Some("tok"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    service
        .start_websocket_stream(&StreamRequest::new("hi"), Arc::new(callbacks))
        .await;

    assert_eq!(
        drain(&mut rx),
        vec![
            CallbackEvent::Content("A".to_string()),
            CallbackEvent::Complete("AB".to_string()),
        ]
    );
    assert_eq!(server.connections.load(Ordering::SeqCst), 2);
    // The reconnect resends the same request
    let first = server.handshakes.recv().await.unwrap();
    let second = server.handshakes.recv().await.unwrap();
    assert_eq!(first, second);
    // A successful open resets the counter
    assert_eq!(service.reconnect_attempts(), 0);
}

#[tokio::test]
async fn test_websocket_reconnect_exhaustion() {
    let (base, accepted) = spawn_dropping_server().await;
    let service = service_for(&base, Some("tok"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    tokio::time::timeout(
        Duration::from_secs(10),
        service.start_websocket_stream(&StreamRequest::new("hi"), Arc::new(callbacks)),
    )
    .await
    .unwrap();

    // One initial attempt plus five reconnects, each reported once
    let events = drain(&mut rx);
    assert_eq!(events.len(), 6);
    assert!(events
        .iter()
        .all(|e| *e == CallbackEvent::Error(WEBSOCKET_ERROR_MESSAGE.to_string())));
    assert_eq!(accepted.load(Ordering::SeqCst), 6);
    assert_eq!(service.reconnect_attempts(), 5);
    assert_eq!(service.state(), SessionState::Idle);
}

// ============================================================================
// Teardown
// ============================================================================

#[tokio::test]
async fn test_close_stops_callbacks_and_reconnects() {
    let server = spawn_ws_server(vec![Script::SendThenHang(vec![content_frame("first")])]).await;
    let service = service_for(&server.base, Some("tok"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    let task = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .start_websocket_stream(&StreamRequest::new("hi"), Arc::new(callbacks))
                .await
        })
    };

    assert_eq!(
        rx.recv().await,
        Some(CallbackEvent::Content("first".to_string()))
    );
    assert!(service.is_active());

    service.close();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();

    // Channel closes with nothing further sent
    assert_eq!(rx.recv().await, None);
    assert_eq!(service.state(), SessionState::Idle);
    assert_eq!(server.connections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_new_stream_replaces_active_session() {
    let server = spawn_ws_server(vec![
        Script::SendThenHang(vec![content_frame("old")]),
        Script::Send(vec![done_frame("new")]),
    ])
    .await;
    let service = service_for(&server.base, Some("tok"));
    let (old_callbacks, mut old_rx) = ChannelCallbacks::channel();

    let old_task = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .start_websocket_stream(&StreamRequest::new("one"), Arc::new(old_callbacks))
                .await
        })
    };
    assert_eq!(
        old_rx.recv().await,
        Some(CallbackEvent::Content("old".to_string()))
    );

    let (new_callbacks, mut new_rx) = ChannelCallbacks::channel();
    service
        .start_websocket_stream(&StreamRequest::new("two"), Arc::new(new_callbacks))
        .await;
    tokio::time::timeout(Duration::from_secs(5), old_task)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(drain(&mut new_rx), vec![CallbackEvent::Complete("new".to_string())]);
    assert_eq!(old_rx.recv().await, None);
    assert_eq!(service.state(), SessionState::Idle);
}
