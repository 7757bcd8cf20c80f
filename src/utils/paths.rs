//! Cross-Platform Path Utilities
//!
//! Functions for resolving the client's data directory (~/.ragio/).

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the RAG.io directory (~/.ragio/)
pub fn ragio_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".ragio"))
}

/// Get the config file path (~/.ragio/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(ragio_dir()?.join("config.json"))
}

/// Get the persisted auth state path (~/.ragio/auth.json)
pub fn auth_path() -> AppResult<PathBuf> {
    Ok(ragio_dir()?.join("auth.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Ensure the parent directory of a file exists
pub fn ensure_parent_dir(file: &Path) -> AppResult<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
