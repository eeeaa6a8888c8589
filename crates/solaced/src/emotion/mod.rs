//! Emotion detection pipeline
//!
//! Two-tier resolution: a cheap local classifier is trusted above a fixed
//! confidence floor; the remote LLM is reserved for ambiguous cases. The
//! orchestrator sequences the tiers and guarantees a total result for any
//! input.

pub mod classifier;
pub mod detector;
pub mod remote;

pub use classifier::{EmotionClassifier, LexiconModel, NativeEmotionModel, NativePrediction};
pub use detector::{DetectionStrategy, EmotionDetector, LocalStrategy, RemoteStrategy};
pub use remote::RemoteEmotionFallback;
