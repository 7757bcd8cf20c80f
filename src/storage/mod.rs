//! Storage Layer
//!
//! Handles local persistence: the JSON config file and the auth state file.

pub mod config;
pub mod credentials;

pub use config::*;
pub use credentials::*;
