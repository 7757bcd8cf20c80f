//! RAG.io Core
//!
//! Foundational types for the RAG.io streaming client workspace. This crate
//! has no I/O and no async runtime dependency.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `streaming` - Stream event envelope, transport selector, adapter trait
//! - `request` - Chat stream request payload
//! - `credentials` - Bearer token provider trait

pub mod credentials;
pub mod error;
pub mod request;
pub mod streaming;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Streaming Types ────────────────────────────────────────────────────
pub use streaming::{FrameError, StreamAdapter, StreamEvent, TransportKind};

// ── Request Payload ────────────────────────────────────────────────────
pub use request::StreamRequest;

// ── Credentials ────────────────────────────────────────────────────────
pub use credentials::{CredentialProvider, StaticToken};
