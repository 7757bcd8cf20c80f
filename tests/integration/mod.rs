//! Integration Tests Module
//!
//! Drives the streaming service against in-process backends: a raw TCP
//! HTTP responder for SSE and a tungstenite server for WebSocket.


// SSE transport tests
mod sse_stream_test;

// WebSocket transport and reconnect tests
mod websocket_stream_test;
