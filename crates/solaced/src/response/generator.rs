//! Response generator
//!
//! Combined mode performs emotion detection and answer generation in one
//! remote call using the EMOTION/CONFIDENCE/RESPONSE contract, halving the
//! round-trips of the two-step pipeline. When the backend is absent or the
//! call fails, a deterministic answer is built from the retrieved snippets.

use crate::llm::LlmBackend;
use crate::response::parser::parse_combined_reply;
use solace_common::{EmotionResult, EmotionScores, KnowledgeBase};
use std::sync::Arc;
use tracing::{info, warn};

pub const RATING_REQUEST: &str =
    "\n\nIf you have a moment, please rate your experience with me below!";

const COMBINED_SYSTEM_PROMPT: &str =
    "You answer customer questions about a fuel card service. Follow the output format exactly.";

/// One generated bot turn
#[derive(Debug, Clone)]
pub struct GeneratedTurn {
    pub response: String,
    pub emotion: EmotionResult,
    pub request_rating: bool,
}

pub struct ResponseGenerator {
    backend: Option<Arc<dyn LlmBackend>>,
    kb: Arc<KnowledgeBase>,
    assistant_name: String,
}

impl ResponseGenerator {
    pub fn new(
        backend: Option<Arc<dyn LlmBackend>>,
        kb: Arc<KnowledgeBase>,
        assistant_name: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            kb,
            assistant_name: assistant_name.into(),
        }
    }

    /// Generate an answer for `query` given already-retrieved snippets.
    /// Total: every failure path yields the deterministic fallback turn.
    pub async fn generate(&self, query: &str, snippets: &[String]) -> GeneratedTurn {
        let request_rating = self.kb.is_closing_intent(query);

        let mut turn = match &self.backend {
            Some(backend) => match self.generate_combined(backend, query, snippets).await {
                Ok(turn) => turn,
                Err(e) => {
                    warn!("Combined generation failed, using fallback answer: {}", e);
                    self.fallback_turn(query, snippets)
                }
            },
            None => self.fallback_turn(query, snippets),
        };

        if request_rating {
            turn.response.push_str(RATING_REQUEST);
            turn.request_rating = true;
        }

        turn
    }

    async fn generate_combined(
        &self,
        backend: &Arc<dyn LlmBackend>,
        query: &str,
        snippets: &[String],
    ) -> anyhow::Result<GeneratedTurn> {
        let doc_text = snippets
            .iter()
            .map(|doc| format!("- {}", doc))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "You are {name}, a knowledgeable and enthusiastic fuel card assistant.\n\
             \n\
             Customer Question: \"{query}\"\n\
             \n\
             Related Information:\n\
             {doc_text}\n\
             \n\
             Your Task (Execute in one step):\n\
             1. Analyze the customer's emotion (Happy, Neutral, Confused, Frustrated, Sad).\n\
             2. Answer the question using the provided information.\n\
             3. Adapt your tone based on the detected emotion (e.g., be empathetic if frustrated, clear if confused).\n\
             \n\
             Required Output Format (Follow strictly):\n\
             EMOTION: [Emotion Label]\n\
             CONFIDENCE: [0.0-1.0]\n\
             RESPONSE: [Your response here]\n\
             \n\
             Example:\n\
             EMOTION: Frustrated\n\
             CONFIDENCE: 0.9\n\
             RESPONSE: I understand your frustration and I'm here to help. To resolve this...\n\
             \n\
             Response:",
            name = self.assistant_name,
        );

        let reply = backend.complete(COMBINED_SYSTEM_PROMPT, &prompt).await?;
        if reply.trim().is_empty() {
            anyhow::bail!("backend returned empty reply");
        }

        let parsed = parse_combined_reply(&reply);
        info!(
            "Combined generation: {} ({:.2}), {} chars",
            parsed.emotion,
            parsed.confidence,
            parsed.response.len()
        );

        Ok(GeneratedTurn {
            response: parsed.response,
            emotion: EmotionResult {
                label: parsed.emotion,
                confidence: parsed.confidence,
                scores: EmotionScores::degenerate(parsed.emotion, parsed.confidence),
            },
            request_rating: false,
        })
    }

    /// Deterministic answer built purely from the knowledge base. Also the
    /// base answer the two-step pipeline hands to the tone adapter.
    pub fn deterministic_answer(&self, query: &str, snippets: &[String]) -> String {
        if self.kb.is_domain_question(query) && !snippets.is_empty() {
            self.kb.build_fallback_answer(snippets)
        } else if self.kb.is_closing_intent(query) {
            "Thank you for chatting with me! If you need help in the future, I'm always here. \
             Have a great day!"
                .to_string()
        } else {
            self.kb.build_fallback_answer(&[])
        }
    }

    /// True when `query` reads as a goodbye, which triggers the rating ask.
    pub fn is_closing_intent(&self, query: &str) -> bool {
        self.kb.is_closing_intent(query)
    }

    fn fallback_turn(&self, query: &str, snippets: &[String]) -> GeneratedTurn {
        GeneratedTurn {
            response: self.deterministic_answer(query, snippets),
            emotion: EmotionResult::default_neutral(),
            request_rating: false,
        }
    }
}
