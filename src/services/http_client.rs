//! HTTP Client Factory
//!
//! Builds the reqwest client used for the SSE transport.

use crate::models::settings::StreamingConfig;
use crate::utils::error::AppResult;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("ragio-client/", env!("CARGO_PKG_VERSION"));

/// Build a `reqwest::Client` for streaming.
///
/// Only the connect phase is bounded; a stream response may legitimately
/// stay open for minutes, so no overall request timeout is set. Stalled
/// bodies are handled by the service's optional idle timeout.
pub fn build_http_client(config: &StreamingConfig) -> AppResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout())
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}
