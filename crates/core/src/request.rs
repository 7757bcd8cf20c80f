//! Chat Stream Request
//!
//! The payload forwarded to the backend when starting a stream. The client
//! does not interpret it; known fields are typed for convenience and anything
//! else rides along in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// Reasoning modes accepted by the backend.
pub const REASONING_MODES: &[&str] = &["standard", "cot", "deep"];

/// Request body for `/api/chat/stream` and the WebSocket handshake frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StreamRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Fields this client has no type for, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StreamRequest {
    /// Create a request carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_provider(mut self, provider_name: impl Into<String>) -> Self {
        self.provider_name = Some(provider_name.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_reasoning_mode(mut self, mode: impl Into<String>) -> Self {
        self.reasoning_mode = Some(mode.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Attach an arbitrary pass-through field.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Check the constraints the backend enforces, so callers can fail
    /// fast before opening a connection.
    pub fn validate(&self) -> CoreResult<()> {
        if self.message.trim().is_empty() {
            return Err(CoreError::validation("message must not be empty"));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(CoreError::validation(format!(
                    "temperature must be between 0.0 and 2.0, got {}",
                    t
                )));
            }
        }
        if let Some(mode) = &self.reasoning_mode {
            if !REASONING_MODES.contains(&mode.as_str()) {
                return Err(CoreError::validation(format!(
                    "reasoning_mode must be one of {:?}, got '{}'",
                    REASONING_MODES, mode
                )));
            }
        }
        Ok(())
    }
}
