//! End-to-end pipeline tests
//!
//! Drive the full detect -> answer -> adapt flow with scripted backends.
//! These tests are DETERMINISTIC - no LLM or network is required; the
//! remote tier is played by `ScriptedBackend`.

use solace_common::{EmotionLabel, EmotionResult, KnowledgeBase};
use solaced::emotion::{
    EmotionClassifier, EmotionDetector, LexiconModel, LocalStrategy, RemoteEmotionFallback,
    RemoteStrategy,
};
use solaced::llm::ScriptedBackend;
use solaced::response::{FrustrationTracker, ResponseGenerator, ToneAdapter};
use solaced::retrieval::{KeywordRetriever, SnippetRetriever, DEFAULT_TOP_K};
use std::sync::Arc;

const CONFIDENCE_THRESHOLD: f64 = 0.3;

fn local_only_detector() -> EmotionDetector {
    let classifier = EmotionClassifier::new(Box::new(LexiconModel));
    EmotionDetector::new(
        vec![Arc::new(LocalStrategy::new(classifier))],
        CONFIDENCE_THRESHOLD,
    )
}

fn two_tier_detector(backend: Arc<ScriptedBackend>) -> EmotionDetector {
    let classifier = EmotionClassifier::new(Box::new(LexiconModel));
    EmotionDetector::new(
        vec![
            Arc::new(LocalStrategy::new(classifier)),
            Arc::new(RemoteStrategy::new(RemoteEmotionFallback::new(backend))),
        ],
        CONFIDENCE_THRESHOLD,
    )
}

// ============================================================================
// Two-Tier Detection
// ============================================================================

/// Clear lexicon signal resolves locally; the remote tier is never consulted
#[tokio::test]
async fn test_clear_signal_stays_local() {
    let backend = Arc::new(ScriptedBackend::new());
    let detector = two_tier_detector(backend.clone());

    let result = detector
        .detect("This is terrible, I hate this broken app!")
        .await;

    assert_eq!(result.label, EmotionLabel::Frustrated);
    assert!(result.confidence >= CONFIDENCE_THRESHOLD);
    assert!(backend.recorded_prompts().is_empty());
}

/// No lexicon hits puts the local tier below threshold; the remote verdict
/// supersedes it
#[tokio::test]
async fn test_ambiguous_text_escalates_to_remote() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply("EMOTION: Sad\nCONFIDENCE: 0.8");
    let detector = two_tier_detector(backend.clone());

    let result = detector.detect("everything went wrong today").await;

    assert_eq!(result.label, EmotionLabel::Sad);
    assert!((result.confidence - 0.8).abs() < 1e-9);
    assert_eq!(backend.recorded_prompts().len(), 1);
}

/// When the remote tier errors out the weak local verdict still stands
#[tokio::test]
async fn test_remote_failure_keeps_weak_local_verdict() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_failure("connection refused");
    let detector = two_tier_detector(backend);

    let result = detector.detect("everything went wrong today").await;

    // zero lexicon hits leave an all-zero distribution
    assert!(result.confidence < CONFIDENCE_THRESHOLD);
    assert_eq!(result.scores.sum(), 0.0);
}

/// Blank input short-circuits before any strategy runs
#[tokio::test]
async fn test_blank_input_is_neutral() {
    let backend = Arc::new(ScriptedBackend::new());
    let detector = two_tier_detector(backend.clone());

    let result = detector.detect("   \n ").await;

    assert_eq!(result, EmotionResult::default_neutral());
    assert!(backend.recorded_prompts().is_empty());
}

// ============================================================================
// Detect -> Retrieve -> Adapt (two-step pipeline)
// ============================================================================

/// One frustrated turn: detection, KB retrieval, and an adapted answer
#[tokio::test]
async fn test_frustrated_turn_end_to_end() {
    let detector = local_only_detector();
    let kb = Arc::new(KnowledgeBase::builtin());
    let retriever = KeywordRetriever::new(kb.clone());
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply("I completely understand. The issuance fee is BD 3.300.");
    let adapter = ToneAdapter::new(
        Some(backend.clone()),
        Arc::new(FrustrationTracker::new()),
        "Solace",
    );
    let generator = ResponseGenerator::new(None, kb, "Solace");

    let message = "This fee is ridiculous and unacceptable!";
    let emotion = detector.detect(message).await;
    assert_eq!(emotion.label, EmotionLabel::Frustrated);

    let snippets = retriever.retrieve(message, DEFAULT_TOP_K, "en");
    assert!(!snippets.is_empty());

    let base = generator.deterministic_answer(message, &snippets);
    let adapted = adapter.adapt(emotion.label, &base, message, Some("s1")).await;

    assert!(adapted.text.starts_with("I completely understand."));
    // first frustrated turn: no hand-off yet
    assert!(!adapted.escalation_offered);

    let prompts = backend.recorded_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].0.contains("FRUSTRATED"));
    assert!(prompts[0].1.contains(message));
}

/// Repeated frustration in one session triggers the hand-off offer
#[tokio::test]
async fn test_second_frustrated_turn_offers_escalation() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply("Let me help with that.");
    backend.push_reply("I'm very sorry this keeps happening.");
    let adapter = ToneAdapter::new(
        Some(backend),
        Arc::new(FrustrationTracker::new()),
        "Solace",
    );

    let first = adapter
        .adapt(EmotionLabel::Frustrated, "base", "it's broken again", Some("s1"))
        .await;
    assert!(!first.escalation_offered);

    let second = adapter
        .adapt(EmotionLabel::Frustrated, "base", "still broken, this is awful", Some("s1"))
        .await;
    assert!(second.escalation_offered);
    assert!(second.text.contains("customer service team"));
}

/// Adapter failure degrades to the emotion prefix, never an error
#[tokio::test]
async fn test_adapter_failure_prefixes_base_answer() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_failure("timeout");
    let adapter = ToneAdapter::new(
        Some(backend),
        Arc::new(FrustrationTracker::new()),
        "Solace",
    );

    let adapted = adapter
        .adapt(EmotionLabel::Sad, "The fee is BD 3.300.", "i feel down", Some("s1"))
        .await;

    assert!(adapted.text.ends_with("The fee is BD 3.300."));
    assert!(adapted.text.len() > "The fee is BD 3.300.".len());
}

/// No backend at all still produces a complete deterministic turn
#[tokio::test]
async fn test_deterministic_turn_without_backend() {
    let detector = local_only_detector();
    let kb = Arc::new(KnowledgeBase::builtin());
    let retriever = KeywordRetriever::new(kb.clone());
    let adapter = ToneAdapter::new(None, Arc::new(FrustrationTracker::new()), "Solace");
    let generator = ResponseGenerator::new(None, kb, "Solace");

    let message = "What is the card issuance fee?";
    let emotion = detector.detect(message).await;
    assert_eq!(emotion.label, EmotionLabel::Neutral);

    let snippets = retriever.retrieve(message, DEFAULT_TOP_K, "en");
    let base = generator.deterministic_answer(message, &snippets);
    let adapted = adapter.adapt(emotion.label, &base, message, Some("s1")).await;

    assert!(adapted.text.contains("BD 3.300"));
    assert!(!adapted.escalation_offered);
}

// ============================================================================
// Combined Generation
// ============================================================================

/// Combined mode resolves emotion and answer in a single remote call
#[tokio::test]
async fn test_combined_turn_with_rating_request() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply("EMOTION: Happy\nCONFIDENCE: 0.9\nRESPONSE: You're very welcome!");
    let kb = Arc::new(KnowledgeBase::builtin());
    let generator = ResponseGenerator::new(Some(backend.clone()), kb, "Solace");

    let turn = generator.generate("thank you so much, goodbye!", &[]).await;

    assert_eq!(turn.emotion.label, EmotionLabel::Happy);
    assert!(turn.request_rating);
    assert!(turn.response.starts_with("You're very welcome!"));
    assert!(turn.response.contains("rate your experience"));
    assert_eq!(backend.recorded_prompts().len(), 1);
}

/// Combined mode backend failure falls back to the KB answer with the
/// canonical Neutral emotion
#[tokio::test]
async fn test_combined_failure_falls_back_to_kb() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_failure("model not loaded");
    let kb = Arc::new(KnowledgeBase::builtin());
    let generator = ResponseGenerator::new(Some(backend), kb.clone(), "Solace");

    let query = "how do I top up my card balance?";
    let snippets = kb.search(query, DEFAULT_TOP_K, "en");
    let turn = generator.generate(query, &snippets).await;

    assert_eq!(turn.emotion, EmotionResult::default_neutral());
    assert!(!turn.response.is_empty());
}
