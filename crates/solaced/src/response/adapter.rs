//! Tone adapter
//!
//! Rewrites the base answer to match the detected emotion via the completion
//! backend, then applies deterministic enhancements the rewrite may have
//! missed. Tracks consecutive frustration per session in an injected store;
//! counters never expire - unbounded growth is an explicit policy, callers
//! reclaim entries through `reset`.
//!
//! The adapter never fails its caller: any internal error degrades to a
//! fixed per-emotion prefix in front of the unmodified base answer.

use crate::llm::LlmBackend;
use solace_common::EmotionLabel;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const CLARIFYING_QUESTIONS: [&str; 3] = [
    "\n\nDoes this help clarify things, or would you like me to explain any specific part in more detail?",
    "\n\nIs there a specific aspect you'd like me to break down further?",
    "\n\nDo you have any questions about these steps?",
];

const ESCALATION_OFFER: &str =
    "\n\nIf you'd prefer, I can provide contact information for our customer service team who can assist you directly.";

const SAD_REASSURANCE: &str = " I'm here to help make this easier for you.";

/// Frustration level at which the human hand-off offer kicks in
const ESCALATION_THRESHOLD: u32 = 2;

// ============================================================================
// Frustration Tracker
// ============================================================================

/// Per-session frustration counters behind a single lock.
///
/// Increment-and-read happens under one write guard, so concurrent turns for
/// the same session cannot lose updates at the store level.
pub struct FrustrationTracker {
    counts: RwLock<HashMap<String, u32>>,
}

impl FrustrationTracker {
    pub fn new() -> Self {
        Self {
            counts: RwLock::new(HashMap::new()),
        }
    }

    /// Current counter, 0 if the session is untracked
    pub async fn level(&self, session_id: &str) -> u32 {
        *self.counts.read().await.get(session_id).unwrap_or(&0)
    }

    /// Atomically increment and return the new counter
    pub async fn increment(&self, session_id: &str) -> u32 {
        let mut counts = self.counts.write().await;
        let count = counts.entry(session_id.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Drop the counter for a session
    pub async fn reset(&self, session_id: &str) {
        self.counts.write().await.remove(session_id);
    }
}

impl Default for FrustrationTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tone Adapter
// ============================================================================

/// Adaptation outcome returned to the route layer
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedAnswer {
    pub text: String,
    /// Set when repeated frustration put the escalation directive in play
    pub escalation_offered: bool,
}

pub struct ToneAdapter {
    backend: Option<Arc<dyn LlmBackend>>,
    tracker: Arc<FrustrationTracker>,
    assistant_name: String,
}

impl ToneAdapter {
    pub fn new(
        backend: Option<Arc<dyn LlmBackend>>,
        tracker: Arc<FrustrationTracker>,
        assistant_name: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            tracker,
            assistant_name: assistant_name.into(),
        }
    }

    /// Rewrite `base_answer` to match the detected emotion. Total: every
    /// failure path still returns usable text.
    pub async fn adapt(
        &self,
        emotion: EmotionLabel,
        base_answer: &str,
        user_message: &str,
        session_id: Option<&str>,
    ) -> AdaptedAnswer {
        // Prospective count for this call; committed only after the remote
        // call resolves so a cancelled turn leaves the counter untouched.
        let frustration_count = match (emotion, session_id) {
            (EmotionLabel::Frustrated, Some(session)) => self.tracker.level(session).await + 1,
            _ => 0,
        };

        let rewritten = self
            .rewrite(emotion, base_answer, user_message, frustration_count)
            .await;

        if emotion == EmotionLabel::Frustrated {
            if let Some(session) = session_id {
                let committed = self.tracker.increment(session).await;
                debug!("Frustration level for session {}: {}", session, committed);
            }
        }

        let text = match rewritten {
            Ok(text) => {
                let (enhanced, _) =
                    apply_enhancements(text, emotion, user_message, frustration_count);
                enhanced
            }
            Err(e) => {
                warn!("Tone adaptation failed, using prefixed base answer: {}", e);
                format!("{}{}", simple_emotion_prefix(emotion), base_answer)
            }
        };

        if frustration_count >= ESCALATION_THRESHOLD {
            info!("Escalation offered after {} frustrated turns", frustration_count);
        }

        AdaptedAnswer {
            escalation_offered: frustration_count >= ESCALATION_THRESHOLD,
            text,
        }
    }

    async fn rewrite(
        &self,
        emotion: EmotionLabel,
        base_answer: &str,
        user_message: &str,
        frustration_count: u32,
    ) -> anyhow::Result<String> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("completion backend not configured"))?;

        let guidance = self.emotion_guidance(emotion, frustration_count);
        let prompt = format!(
            "User's Message: \"{}\"\n\
             Detected Emotion: {}\n\
             \n\
             Base Answer (from knowledge base):\n\
             {}\n\
             \n\
             Your Task:\n\
             Rewrite the base answer to match the user's emotional state. Keep the factual \
             information but adjust the tone, structure, and approach based on the emotion \
             guidelines above.\n\
             \n\
             Adjusted Response:",
            user_message, emotion, base_answer
        );

        let reply = backend.complete(&guidance, &prompt).await?;
        let trimmed = reply.trim();
        if trimmed.is_empty() {
            anyhow::bail!("backend returned empty rewrite");
        }
        Ok(trimmed.to_string())
    }

    /// Per-emotion instruction template sent as the system prompt
    fn emotion_guidance(&self, emotion: EmotionLabel, frustration_count: u32) -> String {
        let name = &self.assistant_name;
        let mut guidance = match emotion {
            EmotionLabel::Happy => format!(
                "You are {name}, a friendly fuel card assistant. The user is in a HAPPY/POSITIVE mood.\n\
                 \n\
                 Guidelines:\n\
                 - Match their positive energy with an upbeat, friendly tone\n\
                 - Keep responses concise and efficient (they're satisfied, don't over-explain)\n\
                 - Use positive language and affirmations\n\
                 - Be warm but professional\n\
                 - 2-3 sentences maximum"
            ),
            EmotionLabel::Neutral => format!(
                "You are {name}, a professional fuel card assistant. The user is in a NEUTRAL/CALM mood.\n\
                 \n\
                 Guidelines:\n\
                 - Use clear, professional, factual tone\n\
                 - Be direct and informative\n\
                 - Focus on accuracy and completeness\n\
                 - Avoid unnecessary emotion or flair\n\
                 - 2-4 sentences, well-structured"
            ),
            EmotionLabel::Confused => format!(
                "You are {name}, a patient and helpful fuel card assistant. The user is CONFUSED/UNCERTAIN.\n\
                 \n\
                 Guidelines:\n\
                 - Break down information into simple, clear steps\n\
                 - Use numbered lists or bullet points when helpful\n\
                 - Provide concrete examples\n\
                 - Ask a clarifying question at the end to ensure understanding\n\
                 - Be patient and reassuring\n\
                 - Avoid jargon, explain technical terms\n\
                 - 3-5 sentences with clear structure"
            ),
            EmotionLabel::Frustrated => format!(
                "You are {name}, an empathetic and solution-focused fuel card assistant. The user is FRUSTRATED/ANGRY.\n\
                 \n\
                 Guidelines:\n\
                 - START with acknowledgment of their frustration (e.g., \"I understand this is frustrating...\")\n\
                 - Be direct and solution-oriented - get to the point quickly\n\
                 - Offer specific, actionable steps\n\
                 - Show empathy but don't over-apologize\n\
                 - If this seems like a recurring issue, suggest escalation or alternative solutions\n\
                 - 2-4 sentences, focused on resolution"
            ),
            EmotionLabel::Sad => format!(
                "You are {name}, a supportive and encouraging fuel card assistant. The user is SAD/DISAPPOINTED.\n\
                 \n\
                 Guidelines:\n\
                 - Use a gentle, supportive tone\n\
                 - Acknowledge their feelings briefly\n\
                 - Provide reassurance while still being helpful\n\
                 - Be encouraging and positive about finding a solution\n\
                 - Avoid being overly cheerful (be genuine)\n\
                 - 3-4 sentences, warm and understanding"
            ),
        };

        if emotion == EmotionLabel::Frustrated && frustration_count >= ESCALATION_THRESHOLD {
            guidance.push_str(
                "\n\nIMPORTANT: This user has been frustrated multiple times. Offer to escalate \
                 to a human representative or provide alternative contact methods.",
            );
        }

        guidance
    }

    /// Remove the tracked counter for a session
    pub async fn reset(&self, session_id: &str) {
        self.tracker.reset(session_id).await;
    }

    /// Current frustration counter for a session (0 if untracked)
    pub async fn get_level(&self, session_id: &str) -> u32 {
        self.tracker.level(session_id).await
    }
}

/// Fixed per-emotion prefix used when the rewrite path fails
pub fn simple_emotion_prefix(emotion: EmotionLabel) -> &'static str {
    match emotion {
        EmotionLabel::Happy => "Great to hear from you! ",
        EmotionLabel::Neutral => "",
        EmotionLabel::Confused => "Let me help clarify that. ",
        EmotionLabel::Frustrated => "I understand this is frustrating. ",
        EmotionLabel::Sad => "I'm sorry you're experiencing this. ",
    }
}

/// Deterministic post-processing of the rewritten text. Each enhancement
/// checks the text first, so reapplying is a no-op. Returns the text and
/// whether the escalation offer was appended.
pub fn apply_enhancements(
    mut text: String,
    emotion: EmotionLabel,
    user_message: &str,
    frustration_count: u32,
) -> (String, bool) {
    let mut escalation_appended = false;

    match emotion {
        EmotionLabel::Confused => {
            if !text.contains('?') {
                let index = user_message.chars().count() % CLARIFYING_QUESTIONS.len();
                text.push_str(CLARIFYING_QUESTIONS[index]);
            }
        }
        EmotionLabel::Frustrated => {
            if frustration_count >= ESCALATION_THRESHOLD {
                let lowered = text.to_lowercase();
                if !lowered.contains("contact") && !lowered.contains("representative") {
                    text.push_str(ESCALATION_OFFER);
                    escalation_appended = true;
                }
            }
        }
        EmotionLabel::Sad => {
            let word_count = text.split_whitespace().count();
            if word_count > 20 {
                let lowered = text.to_lowercase();
                if !["help", "here", "support"].iter().any(|w| lowered.contains(w)) {
                    text.push_str(SAD_REASSURANCE);
                }
            }
        }
        EmotionLabel::Happy | EmotionLabel::Neutral => {}
    }

    (text, escalation_appended)
}
