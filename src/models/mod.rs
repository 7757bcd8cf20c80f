//! Data Models
//!
//! Configuration structures used throughout the client.

pub mod settings;

pub use settings::*;
