//! Utilities
//!
//! Common utilities used throughout the client.

pub mod error;
pub mod logging;
pub mod paths;

pub use error::*;
pub use paths::*;
