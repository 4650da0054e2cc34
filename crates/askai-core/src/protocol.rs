//! JSON bodies exchanged between the chat client and the relay service

use serde::{Deserialize, Serialize};

/// Error text the relay returns for any upstream failure
pub const GENERATION_FAILED: &str = "Failed to generate content";

/// Body of `POST /generate`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    // Missing prompts are forwarded as empty text rather than rejected
    #[serde(default)]
    pub prompt: String,
}

/// Successful `POST /generate` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub output: String,
}

/// Failed `POST /generate` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl ErrorResponse {
    pub fn generation_failed() -> Self {
        Self {
            error: GENERATION_FAILED.to_string(),
        }
    }
}
