//! SSE Stream Integration Tests
//!
//! Runs `start_sse_stream` against a one-shot HTTP responder.

use std::sync::Arc;

use ragio_client::{CallbackEvent, ChannelCallbacks, SessionState, StreamEvent, StreamRequest};

use crate::support::{
    content_frame, done_frame, drain, error_frame, service_for, spawn_http_responder, sse_body,
    unused_base,
};

const SSE_HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "text/event-stream"),
    ("X-Stream-ID", "stream-42"),
];

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_sse_stream_delivers_fragments_then_done() {
    let body = sse_body(&[content_frame("Hel"), content_frame("lo"), done_frame("Hello")]);
    let (base, server) = spawn_http_responder("200 OK", SSE_HEADERS, body).await;
    let service = service_for(&base, Some("tok-123"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    service
        .start_sse_stream(&StreamRequest::new("hi").with_conversation("c1"), Arc::new(callbacks))
        .await;

    assert_eq!(
        drain(&mut rx),
        vec![
            CallbackEvent::Content("Hel".to_string()),
            CallbackEvent::Content("lo".to_string()),
            CallbackEvent::Complete("Hello".to_string()),
        ]
    );

    let buffered = service.recent_buffer_default();
    assert_eq!(buffered.len(), 3);
    assert_eq!(buffered[2].event, StreamEvent::Done("Hello".to_string()));
    assert_eq!(service.state(), SessionState::Idle);

    let request = server.await.unwrap();
    let lower = request.to_lowercase();
    assert!(request.starts_with("POST /api/chat/stream HTTP/1.1"));
    assert!(lower.contains("authorization: bearer tok-123"));
    assert!(lower.contains("content-type: application/json"));
    assert!(request.contains(r#""message":"hi""#));
    assert!(request.contains(r#""conversation_id":"c1""#));
}

#[tokio::test]
async fn test_sse_stream_ignores_events_after_done() {
    let body = sse_body(&[done_frame("A"), content_frame("late")]);
    let (base, _server) = spawn_http_responder("200 OK", SSE_HEADERS, body).await;
    let service = service_for(&base, Some("tok"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    service
        .start_sse_stream(&StreamRequest::new("hi"), Arc::new(callbacks))
        .await;

    assert_eq!(drain(&mut rx), vec![CallbackEvent::Complete("A".to_string())]);
    assert_eq!(service.buffer_len(), 1);
}

#[tokio::test]
async fn test_sse_stream_end_without_done_completes_empty() {
    let body = format!(
        "event: ping\ndata: {{\"timestamp\": \"2024-01-01T00:00:00Z\"}}\n\ndata: {}\r\n\r\n",
        content_frame("A")
    );
    let (base, _server) = spawn_http_responder("200 OK", SSE_HEADERS, body).await;
    let service = service_for(&base, Some("tok"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    service
        .start_sse_stream(&StreamRequest::new("hi"), Arc::new(callbacks))
        .await;

    assert_eq!(
        drain(&mut rx),
        vec![
            CallbackEvent::Content("A".to_string()),
            CallbackEvent::Complete(String::new()),
        ]
    );
}

#[tokio::test]
async fn test_sse_stream_skips_malformed_lines() {
    let body = format!(
        "data: not json\n\ndata: {}\n\ndata: {{\"type\":\"unknown\",\"data\":\"x\"}}\n\ndata: {}\n\n",
        content_frame("ok"),
        done_frame("ok")
    );
    let (base, _server) = spawn_http_responder("200 OK", SSE_HEADERS, body).await;
    let service = service_for(&base, Some("tok"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    service
        .start_sse_stream(&StreamRequest::new("hi"), Arc::new(callbacks))
        .await;

    assert_eq!(
        drain(&mut rx),
        vec![
            CallbackEvent::Content("ok".to_string()),
            CallbackEvent::Complete("ok".to_string()),
        ]
    );
    assert_eq!(service.buffer_len(), 2);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_sse_stream_http_error_status() {
    let (base, _server) = spawn_http_responder(
        "500 Internal Server Error",
        &[("Content-Type", "text/plain")],
        "boom".to_string(),
    )
    .await;
    let service = service_for(&base, Some("tok"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    service
        .start_sse_stream(&StreamRequest::new("hi"), Arc::new(callbacks))
        .await;

    assert_eq!(
        drain(&mut rx),
        vec![CallbackEvent::Error("HTTP error! status: 500".to_string())]
    );
    assert_eq!(service.buffer_len(), 0);
    assert_eq!(service.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_sse_stream_error_event_is_terminal() {
    let body = sse_body(&[
        content_frame("par"),
        error_frame("Rate limit exceeded"),
        content_frame("late"),
    ]);
    let (base, _server) = spawn_http_responder("200 OK", SSE_HEADERS, body).await;
    let service = service_for(&base, Some("tok"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    service
        .start_sse_stream(&StreamRequest::new("hi"), Arc::new(callbacks))
        .await;

    assert_eq!(
        drain(&mut rx),
        vec![
            CallbackEvent::Content("par".to_string()),
            CallbackEvent::Error("Rate limit exceeded".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_sse_stream_connection_refused_reports_once() {
    let service = service_for(&unused_base().await, Some("tok"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    service
        .start_sse_stream(&StreamRequest::new("hi"), Arc::new(callbacks))
        .await;

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], CallbackEvent::Error(message) if !message.is_empty()));
    assert_eq!(service.reconnect_attempts(), 0);
}

// ============================================================================
// Credentials and teardown
// ============================================================================

#[tokio::test]
async fn test_sse_stream_without_token_sends_no_authorization() {
    let body = sse_body(&[done_frame("")]);
    let (base, server) = spawn_http_responder("200 OK", SSE_HEADERS, body).await;
    let service = service_for(&base, None);
    let (callbacks, _rx) = ChannelCallbacks::channel();

    service
        .start_sse_stream(&StreamRequest::new("hi"), Arc::new(callbacks))
        .await;

    let request = server.await.unwrap();
    assert!(!request.to_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn test_close_after_done_is_idempotent() {
    let body = sse_body(&[done_frame("x")]);
    let (base, _server) = spawn_http_responder("200 OK", SSE_HEADERS, body).await;
    let service = service_for(&base, Some("tok"));
    let (callbacks, mut rx) = ChannelCallbacks::channel();

    service
        .start_sse_stream(&StreamRequest::new("hi"), Arc::new(callbacks))
        .await;
    service.close();
    service.close();

    assert_eq!(drain(&mut rx), vec![CallbackEvent::Complete("x".to_string())]);
    assert_eq!(service.state(), SessionState::Idle);
    assert_eq!(service.buffer_len(), 1);
}
