//! Chat and API schemas shared between the daemon routes and clients

use crate::emotion::{EmotionLabel, EmotionScores};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One message in a session transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    /// Detected emotion for user messages; the bot always reports Neutral
    pub emotion: EmotionLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_scores: Option<EmotionScores>,
    #[serde(default)]
    pub request_rating: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>, emotion: EmotionLabel, confidence: f64, scores: EmotionScores) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            emotion,
            emotion_confidence: Some(confidence),
            emotion_scores: Some(scores),
            request_rating: false,
        }
    }

    pub fn bot(text: impl Into<String>, request_rating: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::Bot,
            timestamp: Utc::now(),
            emotion: EmotionLabel::Neutral,
            emotion_confidence: None,
            emotion_scores: None,
            request_rating,
        }
    }
}

// ============================================================================
// Route request/response schemas
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub success: bool,
    pub session_id: Uuid,
    pub initial_message: ChatMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurnRequest {
    pub session_id: Uuid,
    pub message: String,
    /// Language tag for retrieval filtering ("en" unless set)
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurnResponse {
    pub success: bool,
    pub session_id: Uuid,
    pub user_message: ChatMessage,
    pub bot_message: ChatMessage,
    /// Set when repeated frustration triggered the human hand-off offer
    pub escalation_offered: bool,
    pub response_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSessionRequest {
    pub rating: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHistoryResponse {
    pub session_id: Uuid,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
    /// Whether the completion backend answered the liveness probe
    pub llm_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub emotions: Vec<EmotionLabel>,
    /// Number of knowledge-base topics currently loaded
    pub topics: usize,
}
