//! Services
//!
//! The streaming client and the HTTP client factory it uses.

pub mod http_client;
pub mod streaming;

pub use http_client::build_http_client;
pub use streaming::StreamingService;
