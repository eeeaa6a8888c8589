//! Local emotion classifier
//!
//! Wraps a native 7-way model (joy, neutral, surprise, anger, sadness, fear,
//! disgust) behind a trait seam, remaps its labels onto the 5-way taxonomy,
//! and renormalizes the accumulated scores into a probability distribution.
//!
//! The classifier never fails its caller: any internal model error degrades
//! to the canonical Neutral result.

use anyhow::Result;
use solace_common::{EmotionLabel, EmotionResult, EmotionScores};
use tracing::{debug, warn};

/// Native model vocabulary, in the order predictions are reported
pub const NATIVE_LABELS: [&str; 7] = [
    "joy", "neutral", "surprise", "anger", "sadness", "fear", "disgust",
];

/// One native-label score as emitted by the underlying model. Scores need
/// not sum to 1 as received.
#[derive(Debug, Clone)]
pub struct NativePrediction {
    pub label: String,
    pub score: f64,
}

/// Boundary to the underlying multi-class model
pub trait NativeEmotionModel: Send + Sync {
    fn predict(&self, text: &str) -> Result<Vec<NativePrediction>>;
}

/// Fixed remap from the native vocabulary onto the target taxonomy.
/// Unknown native labels fold into Neutral.
fn remap_native(label: &str) -> EmotionLabel {
    match label {
        "joy" => EmotionLabel::Happy,
        "neutral" => EmotionLabel::Neutral,
        // Surprise and fear both read as uncertainty in a support context
        "surprise" | "fear" => EmotionLabel::Confused,
        "anger" | "disgust" => EmotionLabel::Frustrated,
        "sadness" => EmotionLabel::Sad,
        _ => EmotionLabel::Neutral,
    }
}

/// Local classifier over a pluggable native model
pub struct EmotionClassifier {
    model: Box<dyn NativeEmotionModel>,
}

impl EmotionClassifier {
    pub fn new(model: Box<dyn NativeEmotionModel>) -> Self {
        Self { model }
    }

    /// Classify text into the 5-way taxonomy. Total function: blank input
    /// and model errors both yield the canonical Neutral result.
    ///
    /// When the native model reports a zero total raw score the distribution
    /// is left all-zero rather than renormalized; the arg-max then falls on
    /// the first label in the pinned order with confidence 0.0.
    pub fn classify(&self, text: &str) -> EmotionResult {
        if text.trim().is_empty() {
            return EmotionResult::default_neutral();
        }

        let predictions = match self.model.predict(text) {
            Ok(predictions) => predictions,
            Err(e) => {
                warn!("Native emotion model failed: {}", e);
                return EmotionResult::default_neutral();
            }
        };

        let mut scores = EmotionScores::zero();
        for prediction in &predictions {
            scores.add(remap_native(&prediction.label), prediction.score);
        }
        scores.normalize();

        let (label, confidence) = scores.argmax();
        debug!(
            "Local emotion: {} ({:.2}) for '{}'",
            label,
            confidence,
            &text[..text.len().min(50)]
        );

        EmotionResult {
            label,
            confidence,
            scores,
        }
    }
}

// ============================================================================
// Lexicon Model
// ============================================================================

/// Keyword-lexicon scorer over the native 7-way vocabulary.
///
/// Raw scores are whole-word match counts per class; the classifier's
/// renormalization turns them into a distribution. Kept deliberately small:
/// the trait seam exists so a real model can replace this without touching
/// the pipeline.
pub struct LexiconModel;

const JOY_WORDS: &[&str] = &[
    "happy", "glad", "great", "amazing", "love", "thanks", "thank", "awesome",
    "excellent", "perfect", "wonderful", "fantastic", "appreciate", "pleased",
    "delighted", "satisfied", "brilliant", "helpful",
];

const NEUTRAL_WORDS: &[&str] = &[
    "what", "when", "where", "which", "how", "info", "information", "fee",
    "fees", "cost", "price", "balance", "card", "account", "please", "apply",
];

const SURPRISE_WORDS: &[&str] = &[
    "surprised", "wow", "unexpected", "suddenly", "confused", "confusing",
    "puzzled", "unsure", "unclear", "lost",
];

const ANGER_WORDS: &[&str] = &[
    "angry", "furious", "annoyed", "terrible", "hate", "ridiculous",
    "unacceptable", "worst", "awful", "useless", "broken", "frustrating",
    "frustrated", "never", "complaint",
];

const SADNESS_WORDS: &[&str] = &[
    "sad", "unhappy", "disappointed", "upset", "sorry", "discouraged",
    "unfortunately", "hopeless", "miserable",
];

const FEAR_WORDS: &[&str] = &[
    "worried", "afraid", "scared", "nervous", "anxious", "fear",
];

const DISGUST_WORDS: &[&str] = &[
    "disgusting", "gross", "horrible", "nasty", "revolting",
];

impl LexiconModel {
    fn class_lexicon(label: &str) -> &'static [&'static str] {
        match label {
            "joy" => JOY_WORDS,
            "neutral" => NEUTRAL_WORDS,
            "surprise" => SURPRISE_WORDS,
            "anger" => ANGER_WORDS,
            "sadness" => SADNESS_WORDS,
            "fear" => FEAR_WORDS,
            "disgust" => DISGUST_WORDS,
            _ => &[],
        }
    }
}

impl NativeEmotionModel for LexiconModel {
    fn predict(&self, text: &str) -> Result<Vec<NativePrediction>> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|t| !t.is_empty())
            .collect();

        let predictions = NATIVE_LABELS
            .iter()
            .map(|label| {
                let lexicon = Self::class_lexicon(label);
                let hits = tokens
                    .iter()
                    .filter(|token| lexicon.contains(&token.trim_matches('\'')))
                    .count();
                NativePrediction {
                    label: label.to_string(),
                    score: hits as f64,
                }
            })
            .collect();

        Ok(predictions)
    }
}
