//! Emotion detection orchestrator
//!
//! A prioritized chain of detection strategies sharing one capability:
//! `attempt(text) -> Option<EmotionResult>`. The chain is walked in order
//! until a result meets the confidence threshold; a below-threshold result
//! from a later strategy supersedes an earlier one, and a below-threshold
//! result is still better than none. Detection is total - every input gets
//! a result from the fixed 5-set, blank input short-circuits to the
//! canonical Neutral default before any strategy runs.

use crate::emotion::classifier::EmotionClassifier;
use crate::emotion::remote::RemoteEmotionFallback;
use async_trait::async_trait;
use solace_common::EmotionResult;
use std::sync::Arc;
use tracing::{debug, info};

/// One tier in the detection chain
#[async_trait]
pub trait DetectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Best-effort classification. None means this tier cannot contribute.
    async fn attempt(&self, text: &str) -> Option<EmotionResult>;
}

/// Local classifier tier - cheap, always produces a result
pub struct LocalStrategy {
    classifier: EmotionClassifier,
}

impl LocalStrategy {
    pub fn new(classifier: EmotionClassifier) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl DetectionStrategy for LocalStrategy {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn attempt(&self, text: &str) -> Option<EmotionResult> {
        Some(self.classifier.classify(text))
    }
}

/// Remote LLM tier - expensive, reserved for ambiguous cases
pub struct RemoteStrategy {
    fallback: RemoteEmotionFallback,
}

impl RemoteStrategy {
    pub fn new(fallback: RemoteEmotionFallback) -> Self {
        Self { fallback }
    }
}

#[async_trait]
impl DetectionStrategy for RemoteStrategy {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn attempt(&self, text: &str) -> Option<EmotionResult> {
        self.fallback.classify_remote(text).await
    }
}

/// Sequences the strategy chain and owns the confidence threshold
pub struct EmotionDetector {
    strategies: Vec<Arc<dyn DetectionStrategy>>,
    confidence_threshold: f64,
}

impl EmotionDetector {
    pub fn new(strategies: Vec<Arc<dyn DetectionStrategy>>, confidence_threshold: f64) -> Self {
        Self {
            strategies,
            confidence_threshold,
        }
    }

    /// Resolve the emotion for one user turn. Never fails, never returns a
    /// label outside the taxonomy.
    pub async fn detect(&self, text: &str) -> EmotionResult {
        if text.trim().is_empty() {
            return EmotionResult::default_neutral();
        }

        let mut below_threshold: Option<EmotionResult> = None;

        for strategy in &self.strategies {
            let Some(result) = strategy.attempt(text).await else {
                debug!("Strategy '{}' produced nothing", strategy.name());
                continue;
            };

            if result.confidence >= self.confidence_threshold {
                debug!(
                    "Strategy '{}' accepted: {} ({:.2})",
                    strategy.name(),
                    result.label,
                    result.confidence
                );
                return result;
            }

            info!(
                "Strategy '{}' below threshold: {} ({:.2} < {:.2})",
                strategy.name(),
                result.label,
                result.confidence,
                self.confidence_threshold
            );
            // A later tier's answer supersedes an earlier weak one
            below_threshold = Some(result);
        }

        // A weak signal beats no signal
        below_threshold.unwrap_or_else(EmotionResult::default_neutral)
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solace_common::{EmotionLabel, EmotionScores};

    /// Strategy scripted with a fixed outcome
    struct FixedStrategy {
        name: &'static str,
        result: Option<EmotionResult>,
    }

    impl FixedStrategy {
        fn some(name: &'static str, label: EmotionLabel, confidence: f64) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Some(EmotionResult {
                    label,
                    confidence,
                    scores: EmotionScores::degenerate(label, confidence),
                }),
            })
        }

        fn none(name: &'static str) -> Arc<Self> {
            Arc::new(Self { name, result: None })
        }
    }

    #[async_trait]
    impl DetectionStrategy for FixedStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn attempt(&self, _text: &str) -> Option<EmotionResult> {
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_first_confident_strategy_short_circuits() {
        let detector = EmotionDetector::new(
            vec![
                FixedStrategy::some("local", EmotionLabel::Happy, 0.8),
                FixedStrategy::some("remote", EmotionLabel::Sad, 0.9),
            ],
            0.3,
        );
        let result = detector.detect("hello").await;
        assert_eq!(result.label, EmotionLabel::Happy);
    }

    #[tokio::test]
    async fn test_later_strategy_supersedes_weak_local() {
        let detector = EmotionDetector::new(
            vec![
                FixedStrategy::some("local", EmotionLabel::Neutral, 0.2),
                FixedStrategy::some("remote", EmotionLabel::Frustrated, 0.85),
            ],
            0.3,
        );
        let result = detector.detect("hello").await;
        assert_eq!(result.label, EmotionLabel::Frustrated);
    }

    #[tokio::test]
    async fn test_weak_local_kept_when_remote_absent() {
        let detector = EmotionDetector::new(
            vec![
                FixedStrategy::some("local", EmotionLabel::Sad, 0.2),
                FixedStrategy::none("remote"),
            ],
            0.3,
        );
        let result = detector.detect("hello").await;
        // low-confidence-but-present signal is not discarded
        assert_eq!(result.label, EmotionLabel::Sad);
        assert!((result.confidence - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_weak_remote_supersedes_weak_local() {
        let detector = EmotionDetector::new(
            vec![
                FixedStrategy::some("local", EmotionLabel::Sad, 0.2),
                FixedStrategy::some("remote", EmotionLabel::Confused, 0.25),
            ],
            0.3,
        );
        let result = detector.detect("hello").await;
        assert_eq!(result.label, EmotionLabel::Confused);
    }

    #[tokio::test]
    async fn test_exhausted_chain_yields_default() {
        let detector = EmotionDetector::new(
            vec![FixedStrategy::none("local"), FixedStrategy::none("remote")],
            0.3,
        );
        let result = detector.detect("hello").await;
        assert_eq!(result, EmotionResult::default_neutral());
    }

    #[tokio::test]
    async fn test_empty_chain_yields_default() {
        let detector = EmotionDetector::new(vec![], 0.3);
        assert_eq!(detector.detect("hello").await, EmotionResult::default_neutral());
    }

    #[tokio::test]
    async fn test_blank_input_short_circuits_before_strategies() {
        // A strategy that would panic if consulted
        struct PanicStrategy;
        #[async_trait]
        impl DetectionStrategy for PanicStrategy {
            fn name(&self) -> &'static str {
                "panic"
            }
            async fn attempt(&self, _text: &str) -> Option<EmotionResult> {
                panic!("must not be reached")
            }
        }

        let detector = EmotionDetector::new(vec![Arc::new(PanicStrategy)], 0.3);
        assert_eq!(detector.detect("   ").await, EmotionResult::default_neutral());
    }
}
