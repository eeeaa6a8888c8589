//! Remote emotion fallback
//!
//! Asks the completion backend to classify a message when the local result
//! is too weak. Absence is the only failure mode: transport errors and
//! unusable replies both come back as None, and the caller proceeds with
//! whatever local result it already has.

use crate::llm::LlmBackend;
use crate::response::parser::{
    parse_confidence_value, parse_emotion_value, CONFIDENCE_MARKER, EMOTION_MARKER,
};
use solace_common::{EmotionResult, EmotionScores};
use std::sync::Arc;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str =
    "You classify the emotion of customer support messages. Reply only in the requested format.";

/// Remote classifier over the shared completion backend
pub struct RemoteEmotionFallback {
    backend: Arc<dyn LlmBackend>,
}

impl RemoteEmotionFallback {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    fn build_prompt(text: &str) -> String {
        format!(
            "Analyze the emotion in this message and classify it into exactly ONE of these 5 categories:\n\
             - Happy (positive, joyful, satisfied, grateful)\n\
             - Neutral (calm, informational, matter-of-fact)\n\
             - Confused (uncertain, puzzled, seeking clarification)\n\
             - Frustrated (angry, annoyed, impatient, irritated)\n\
             - Sad (disappointed, upset, discouraged, unhappy)\n\
             \n\
             Message: \"{}\"\n\
             \n\
             Respond with ONLY the emotion label and a confidence score (0.0-1.0) in this exact format:\n\
             EMOTION: [label]\n\
             CONFIDENCE: [score]\n\
             \n\
             Example:\n\
             EMOTION: Frustrated\n\
             CONFIDENCE: 0.85",
            text
        )
    }

    /// Classify via the remote LLM. None means "could not improve on the
    /// local result" - never an error.
    pub async fn classify_remote(&self, text: &str) -> Option<EmotionResult> {
        let reply = match self.backend.complete(SYSTEM_PROMPT, &Self::build_prompt(text)).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Remote emotion fallback unavailable: {}", e);
                return None;
            }
        };

        Some(Self::parse_reply(&reply))
    }

    /// Lenient, order-independent line parse. Unknown lines are ignored;
    /// a missing label defaults to Neutral and a missing confidence to 0.5.
    fn parse_reply(reply: &str) -> EmotionResult {
        let mut label = solace_common::EmotionLabel::Neutral;
        let mut confidence = 0.5;

        for line in reply.lines() {
            let trimmed = line.trim_start();
            if let Some(rest) = trimmed.strip_prefix(EMOTION_MARKER) {
                label = parse_emotion_value(rest);
            } else if let Some(rest) = trimmed.strip_prefix(CONFIDENCE_MARKER) {
                confidence = parse_confidence_value(rest);
            }
        }

        debug!("Remote emotion: {} ({:.2})", label, confidence);

        EmotionResult {
            label,
            confidence,
            scores: EmotionScores::degenerate(label, confidence),
        }
    }
}
