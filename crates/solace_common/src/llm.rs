//! LLM wire types - Ollama-compatible chat schema
//!
//! The daemon talks to the completion backend over the /api/chat endpoint.
//! Only the fields we read are modeled; the rest are ignored on deserialize.

use serde::{Deserialize, Serialize};

/// Chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessagePart>,
    #[serde(default)]
    pub stream: bool,
    /// How long the backend keeps the model loaded after this request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

/// Single message in a chat exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessagePart {
    pub role: String,
    pub content: String,
}

impl ChatMessagePart {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    pub message: ChatMessagePart,
    pub done: bool,
    #[serde(default)]
    pub total_duration: Option<u64>,
}
