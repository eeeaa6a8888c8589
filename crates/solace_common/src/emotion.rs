//! Emotion taxonomy - the fixed 5-label set used across detection and adaptation
//!
//! Every externally-sourced label outside this set is coerced to Neutral.
//! Label iteration order is pinned (Happy, Neutral, Confused, Frustrated, Sad)
//! so arg-max tie-breaking is deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed 5-way emotion taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionLabel {
    Happy,
    Neutral,
    Confused,
    Frustrated,
    Sad,
}

impl EmotionLabel {
    /// Pinned iteration order. Arg-max ties resolve to the first label seen
    /// in this order.
    pub const ALL: [EmotionLabel; 5] = [
        EmotionLabel::Happy,
        EmotionLabel::Neutral,
        EmotionLabel::Confused,
        EmotionLabel::Frustrated,
        EmotionLabel::Sad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Happy => "Happy",
            EmotionLabel::Neutral => "Neutral",
            EmotionLabel::Confused => "Confused",
            EmotionLabel::Frustrated => "Frustrated",
            EmotionLabel::Sad => "Sad",
        }
    }

    /// Parse a label case-insensitively. Returns None for anything outside
    /// the 5-set; callers decide whether to coerce to Neutral.
    pub fn parse(s: &str) -> Option<EmotionLabel> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Some(EmotionLabel::Happy),
            "neutral" => Some(EmotionLabel::Neutral),
            "confused" => Some(EmotionLabel::Confused),
            "frustrated" => Some(EmotionLabel::Frustrated),
            "sad" => Some(EmotionLabel::Sad),
            _ => None,
        }
    }

    /// Secondary label map for replies written in the Arabic vocabulary.
    /// The remote model occasionally echoes the label in the prompt language.
    pub fn parse_arabic(s: &str) -> Option<EmotionLabel> {
        match s.trim() {
            "سعيد" => Some(EmotionLabel::Happy),
            "محايد" => Some(EmotionLabel::Neutral),
            "مرتبك" => Some(EmotionLabel::Confused),
            "محبط" => Some(EmotionLabel::Frustrated),
            "حزين" => Some(EmotionLabel::Sad),
            _ => None,
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability mass over the 5-label taxonomy.
///
/// Produced normalized (sum 1.0) by the local classifier, degenerate by the
/// remote fallback. The all-zero distribution is a documented edge case: it
/// occurs only when the native model returned a zero total raw score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionScores {
    #[serde(rename = "Happy")]
    pub happy: f64,
    #[serde(rename = "Neutral")]
    pub neutral: f64,
    #[serde(rename = "Confused")]
    pub confused: f64,
    #[serde(rename = "Frustrated")]
    pub frustrated: f64,
    #[serde(rename = "Sad")]
    pub sad: f64,
}

impl Default for EmotionScores {
    fn default() -> Self {
        Self::zero()
    }
}

impl EmotionScores {
    pub fn zero() -> Self {
        Self {
            happy: 0.0,
            neutral: 0.0,
            confused: 0.0,
            frustrated: 0.0,
            sad: 0.0,
        }
    }

    /// All mass on one label
    pub fn concentrated(label: EmotionLabel) -> Self {
        let mut scores = Self::zero();
        scores.set(label, 1.0);
        scores
    }

    /// Degenerate distribution: the dominant label gets `confidence`, the
    /// remaining four split the residual mass equally.
    pub fn degenerate(label: EmotionLabel, confidence: f64) -> Self {
        let residual = (1.0 - confidence) / 4.0;
        let mut scores = Self {
            happy: residual,
            neutral: residual,
            confused: residual,
            frustrated: residual,
            sad: residual,
        };
        scores.set(label, confidence);
        scores
    }

    pub fn get(&self, label: EmotionLabel) -> f64 {
        match label {
            EmotionLabel::Happy => self.happy,
            EmotionLabel::Neutral => self.neutral,
            EmotionLabel::Confused => self.confused,
            EmotionLabel::Frustrated => self.frustrated,
            EmotionLabel::Sad => self.sad,
        }
    }

    pub fn set(&mut self, label: EmotionLabel, value: f64) {
        match label {
            EmotionLabel::Happy => self.happy = value,
            EmotionLabel::Neutral => self.neutral = value,
            EmotionLabel::Confused => self.confused = value,
            EmotionLabel::Frustrated => self.frustrated = value,
            EmotionLabel::Sad => self.sad = value,
        }
    }

    pub fn add(&mut self, label: EmotionLabel, value: f64) {
        self.set(label, self.get(label) + value);
    }

    pub fn sum(&self) -> f64 {
        EmotionLabel::ALL.iter().map(|l| self.get(*l)).sum()
    }

    /// Scale components so they sum to 1.0. A zero total is left untouched
    /// (all-zero distribution), matching the classifier contract.
    pub fn normalize(&mut self) {
        let total = self.sum();
        if total > 0.0 {
            for label in EmotionLabel::ALL {
                self.set(label, self.get(label) / total);
            }
        }
    }

    /// Arg-max over the pinned label order; ties go to the first label seen.
    pub fn argmax(&self) -> (EmotionLabel, f64) {
        let mut best = EmotionLabel::ALL[0];
        let mut best_score = self.get(best);
        for label in &EmotionLabel::ALL[1..] {
            let score = self.get(*label);
            if score > best_score {
                best = *label;
                best_score = score;
            }
        }
        (best, best_score)
    }
}

/// One detection outcome for one user turn. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
    pub label: EmotionLabel,
    pub confidence: f64,
    pub scores: EmotionScores,
}

impl EmotionResult {
    /// The canonical "no signal" result: Neutral with full confidence. Used
    /// for blank input and whenever no detector can proceed.
    pub fn default_neutral() -> Self {
        Self {
            label: EmotionLabel::Neutral,
            confidence: 1.0,
            scores: EmotionScores::concentrated(EmotionLabel::Neutral),
        }
    }
}
