//! JSON Configuration Management
//!
//! Handles reading and writing the client configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::ClientConfig;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_parent_dir};

/// Configuration service for managing client settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: ClientConfig,
}

impl ConfigService {
    /// Load the config from ~/.ragio/config.json, creating defaults if missing
    pub fn new() -> AppResult<Self> {
        Self::open(config_path()?)
    }

    /// Load the config from `path`, creating defaults if missing
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let config_path = path.into();
        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = ClientConfig::default();
            Self::save_to_file(&config_path, &default_config)?;
            tracing::info!("Created default config at {}", config_path.display());
            default_config
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<ClientConfig> {
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &ClientConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        ensure_parent_dir(path)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get a clone of the current configuration
    pub fn get_config_clone(&self) -> ClientConfig {
        self.config.clone()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Replace the configuration and persist it
    pub fn update_config(&mut self, config: ClientConfig) -> AppResult<()> {
        Self::save_to_file(&self.config_path, &config)?;
        self.config = config;
        Ok(())
    }

    /// Reload configuration from disk
    pub fn reload(&mut self) -> AppResult<()> {
        self.config = Self::load_from_file(&self.config_path)?;
        Ok(())
    }
}
