//! Streaming Endpoints
//!
//! Fixed backend paths and the http -> ws scheme rewrite.

use url::Url;

use crate::utils::error::{AppError, AppResult};

/// SSE chat stream, relative to the API base.
pub const STREAM_PATH: &str = "/api/chat/stream";

/// WebSocket chat stream, relative to the API base.
pub const WEBSOCKET_PATH: &str = "/api/chat/ws";

/// Response header carrying the server-assigned stream id.
pub const STREAM_ID_HEADER: &str = "x-stream-id";

fn join(api_base: &str, path: &str) -> String {
    format!("{}{}", api_base.trim_end_matches('/'), path)
}

/// Full URL of the SSE endpoint.
pub fn stream_url(api_base: &str) -> String {
    join(api_base, STREAM_PATH)
}

/// Full URL of the WebSocket endpoint, with `http`/`https` rewritten to
/// `ws`/`wss`.
pub fn websocket_url(api_base: &str) -> AppResult<Url> {
    let mut url = Url::parse(&join(api_base, WEBSOCKET_PATH))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(AppError::config(format!(
                "Unsupported API base scheme for WebSocket: {}",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| AppError::config(format!("Cannot use scheme {} for {}", scheme, url)))?;
    Ok(url)
}
