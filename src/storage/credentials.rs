//! Persisted Auth State
//!
//! Bearer token kept in ~/.ragio/auth.json under a fixed key. The file is
//! re-read on every lookup so a token refreshed by another process is picked
//! up by the next stream.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use ragio_core::credentials::CredentialProvider;

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{auth_path, ensure_parent_dir};

/// Key under which the bearer token is stored.
pub const TOKEN_KEY: &str = "token";

/// File-backed token store.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store at the default location (~/.ragio/auth.json)
    pub fn new() -> AppResult<Self> {
        Ok(Self::at(auth_path()?))
    }

    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_state(&self) -> AppResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::validation(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_state(&self, state: &Map<String, Value>) -> AppResult<()> {
        ensure_parent_dir(&self.path)?;
        fs::write(&self.path, serde_json::to_string_pretty(state)?)?;
        Ok(())
    }

    /// Read the stored token.
    pub fn token(&self) -> AppResult<Option<String>> {
        let state = self.read_state()?;
        Ok(state
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    /// Persist a token, keeping any other keys in the file.
    pub fn set_token(&self, token: &str) -> AppResult<()> {
        let mut state = self.read_state().unwrap_or_default();
        state.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_state(&state)
    }

    /// Remove the token, keeping any other keys in the file.
    pub fn clear_token(&self) -> AppResult<()> {
        let mut state = self.read_state()?;
        if state.remove(TOKEN_KEY).is_some() {
            self.write_state(&state)?;
        }
        Ok(())
    }
}

impl CredentialProvider for FileTokenStore {
    fn bearer_token(&self) -> Option<String> {
        match self.token() {
            Ok(token) => {
                if token.is_none() {
                    tracing::debug!("No bearer token in {}", self.path.display());
                }
                token
            }
            Err(e) => {
                tracing::warn!("Failed to read auth state {}: {}", self.path.display(), e);
                None
            }
        }
    }
}
