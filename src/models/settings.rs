//! Settings Models
//!
//! Client configuration stored in config.json.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::services::streaming::backoff::ReconnectPolicy;
use crate::services::streaming::buffer::DEFAULT_BUFFER_CAPACITY;

/// Default backend base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Client configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the chat backend (http or https)
    pub api_base: String,
    /// Streaming transport settings
    pub streaming: StreamingConfig,
    /// Logging settings for the command-line client
    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            streaming: StreamingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Streaming transport settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Number of recent events kept for diagnostics
    pub buffer_capacity: usize,
    /// WebSocket reconnect attempts before giving up
    pub max_reconnect_attempts: u32,
    /// Attempt `k` waits `base * 2^k` milliseconds...
    pub reconnect_base_delay_ms: u64,
    /// ...capped at this many milliseconds
    pub reconnect_max_delay_ms: u64,
    /// End a stream that produces no data for this long; unset waits forever
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,
    /// TCP/TLS connect timeout for the SSE request
    pub connect_timeout_secs: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_reconnect_attempts: 5,
            reconnect_base_delay_ms: 1000,
            reconnect_max_delay_ms: 16_000,
            idle_timeout_secs: None,
            connect_timeout_secs: 30,
        }
    }
}

impl StreamingConfig {
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            self.max_reconnect_attempts,
            Duration::from_millis(self.reconnect_base_delay_ms),
            Duration::from_millis(self.reconnect_max_delay_ms),
        )
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level or `EnvFilter` directive string
    pub level: String,
    pub format: LogFormat,
    /// Append logs to this file instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file_path: None,
        }
    }
}

/// Per-invocation overrides (command-line flags, environment)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_base: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub idle_timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Apply overrides on top of the loaded configuration
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(api_base) = overrides.api_base {
            self.api_base = api_base;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
        if let Some(secs) = overrides.idle_timeout_secs {
            self.streaming.idle_timeout_secs = Some(secs);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let base = self.api_base.trim();
        if base.is_empty() {
            return Err("api_base must not be empty".to_string());
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(format!(
                "Invalid api_base: {}. Must start with http:// or https://",
                self.api_base
            ));
        }

        if self.streaming.buffer_capacity == 0 {
            return Err("buffer_capacity must be at least 1".to_string());
        }
        if self.streaming.reconnect_base_delay_ms > self.streaming.reconnect_max_delay_ms {
            return Err("reconnect_base_delay_ms cannot exceed reconnect_max_delay_ms".to_string());
        }
        if self.streaming.idle_timeout_secs == Some(0) {
            return Err("idle_timeout_secs must be positive when set".to_string());
        }

        Ok(())
    }
}
