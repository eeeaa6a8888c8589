//! API routes for solaced

use crate::response::generator::RATING_REQUEST;
use crate::retrieval::DEFAULT_TOP_K;
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use solace_common::{
    ChatMessage, ChatTurnRequest, ChatTurnResponse, EmotionLabel, HealthResponse, InfoResponse,
    RateSessionRequest, SessionHistoryResponse, StartSessionResponse,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

type AppStateArc = Arc<AppState>;

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/info", get(info_route))
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    let llm_available = match &state.backend {
        Some(backend) => backend.is_available().await,
        None => false,
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        llm_available,
    })
}

async fn info_route(State(state): State<AppStateArc>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: state.config.server.assistant_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        emotions: EmotionLabel::ALL.to_vec(),
        topics: state.kb.topics.len(),
    })
}

// ============================================================================
// Session Routes
// ============================================================================

pub fn session_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/session/start", post(start_session))
        .route("/api/session/:id/history", get(session_history))
        .route("/api/session/:id/rating", post(rate_session))
}

async fn start_session(State(state): State<AppStateArc>) -> Json<StartSessionResponse> {
    let greeting = ChatMessage::bot(
        format!(
            "Hello! I'm {}, your fuel card assistant. How can I help you today?",
            state.config.server.assistant_name
        ),
        false,
    );
    let session = state.sessions.create(greeting.clone()).await;
    info!("  Started session {}", session.id);

    Json(StartSessionResponse {
        success: true,
        session_id: session.id,
        initial_message: greeting,
    })
}

async fn session_history(
    State(state): State<AppStateArc>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionHistoryResponse>, (StatusCode, String)> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Session '{}' not found", id)))?;

    Ok(Json(SessionHistoryResponse {
        session_id: session.id,
        messages: session.messages,
        rating: session.rating,
    }))
}

#[derive(Debug, Serialize)]
struct RateSessionResponse {
    success: bool,
}

async fn rate_session(
    State(state): State<AppStateArc>,
    Path(id): Path<Uuid>,
    Json(req): Json<RateSessionRequest>,
) -> Result<Json<RateSessionResponse>, (StatusCode, String)> {
    if !(1..=5).contains(&req.rating) {
        return Err((
            StatusCode::BAD_REQUEST,
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    if !state.sessions.set_rating(id, req.rating).await {
        return Err((StatusCode::NOT_FOUND, format!("Session '{}' not found", id)));
    }
    info!("  Session {} rated {}/5", id, req.rating);
    Ok(Json(RateSessionResponse { success: true }))
}

// ============================================================================
// Chat Routes
// ============================================================================

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new().route("/api/chat/message", post(chat_message))
}

async fn chat_message(
    State(state): State<AppStateArc>,
    Json(req): Json<ChatTurnRequest>,
) -> Result<Json<ChatTurnResponse>, (StatusCode, String)> {
    let started = Instant::now();

    if req.message.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Message is empty".to_string()));
    }
    if !state.sessions.exists(req.session_id).await {
        return Err((
            StatusCode::NOT_FOUND,
            format!("Session '{}' not found", req.session_id),
        ));
    }

    let snippets = state
        .retriever
        .retrieve(&req.message, DEFAULT_TOP_K, &req.language);

    let (bot_text, emotion, escalation_offered, request_rating) =
        if state.config.emotion.combined_generation {
            let turn = state.generator.generate(&req.message, &snippets).await;
            (turn.response, turn.emotion, false, turn.request_rating)
        } else {
            let emotion = state.detector.detect(&req.message).await;
            let base = state.generator.deterministic_answer(&req.message, &snippets);
            let session_key = req.session_id.to_string();
            let adapted = state
                .adapter
                .adapt(emotion.label, &base, &req.message, Some(&session_key))
                .await;

            let mut text = adapted.text;
            let request_rating = state.generator.is_closing_intent(&req.message);
            if request_rating {
                text.push_str(RATING_REQUEST);
            }
            (text, emotion, adapted.escalation_offered, request_rating)
        };

    info!(
        "  Turn in session {}: {} ({:.2})",
        req.session_id, emotion.label, emotion.confidence
    );

    let user_message = ChatMessage::user(
        &req.message,
        emotion.label,
        emotion.confidence,
        emotion.scores.clone(),
    );
    let bot_message = ChatMessage::bot(bot_text, request_rating);

    state
        .sessions
        .add_message(req.session_id, user_message.clone())
        .await;
    state
        .sessions
        .add_message(req.session_id, bot_message.clone())
        .await;

    let response_time_ms = started.elapsed().as_millis() as u64;
    state.analytics.record(
        req.session_id,
        &req.message,
        emotion.label,
        emotion.confidence,
        emotion.scores,
        response_time_ms,
    );

    Ok(Json(ChatTurnResponse {
        success: true,
        session_id: req.session_id,
        user_message,
        bot_message,
        escalation_offered,
        response_time_ms,
    }))
}

// ============================================================================
// Analytics Routes
// ============================================================================

pub fn analytics_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/analytics/emotions", get(emotion_statistics))
        .route("/api/analytics/recent", get(recent_records))
}

#[derive(Debug, Deserialize)]
struct EmotionStatsQuery {
    session_id: Option<Uuid>,
}

async fn emotion_statistics(
    State(state): State<AppStateArc>,
    Query(query): Query<EmotionStatsQuery>,
) -> Json<crate::analytics::EmotionStatistics> {
    Json(state.analytics.emotion_statistics(query.session_id))
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

async fn recent_records(
    State(state): State<AppStateArc>,
    Query(query): Query<RecentQuery>,
) -> Json<Vec<crate::analytics::EmotionRecord>> {
    Json(state.analytics.recent(query.limit.unwrap_or(20)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalyticsLogger;
    use crate::emotion::{EmotionClassifier, EmotionDetector, LexiconModel, LocalStrategy};
    use crate::llm::{LlmBackend, ScriptedBackend};
    use crate::response::{FrustrationTracker, ResponseGenerator, ToneAdapter};
    use crate::retrieval::KeywordRetriever;
    use crate::session::SessionManager;
    use solace_common::{KnowledgeBase, SolaceConfig};

    fn state_with(backend: Option<Arc<dyn LlmBackend>>) -> AppStateArc {
        let config = SolaceConfig::default();
        let kb = Arc::new(KnowledgeBase::builtin());
        let classifier = EmotionClassifier::new(Box::new(LexiconModel));
        let detector = EmotionDetector::new(
            vec![Arc::new(LocalStrategy::new(classifier))],
            config.emotion.confidence_threshold,
        );
        let adapter = ToneAdapter::new(
            backend.clone(),
            Arc::new(FrustrationTracker::new()),
            config.server.assistant_name.clone(),
        );
        let generator = ResponseGenerator::new(
            backend.clone(),
            kb.clone(),
            config.server.assistant_name.clone(),
        );
        let retriever = Arc::new(KeywordRetriever::new(kb.clone()));
        let analytics = AnalyticsLogger::new(&config.analytics);

        Arc::new(AppState {
            config,
            backend,
            detector,
            adapter,
            generator,
            retriever,
            kb,
            sessions: SessionManager::new(),
            analytics,
            start_time: Instant::now(),
        })
    }

    #[tokio::test]
    async fn test_health_reports_backend_liveness() {
        let Json(down) = health(State(state_with(Some(Arc::new(
            ScriptedBackend::unavailable(),
        ))))).await;
        assert_eq!(down.status, "ok");
        assert!(!down.llm_available);

        let Json(up) = health(State(state_with(Some(Arc::new(ScriptedBackend::new()))))).await;
        assert!(up.llm_available);
    }

    #[tokio::test]
    async fn test_health_without_backend() {
        let Json(response) = health(State(state_with(None))).await;
        assert_eq!(response.status, "ok");
        assert!(!response.llm_available);
    }

    #[tokio::test]
    async fn test_info_reports_taxonomy_and_topics() {
        let Json(info) = info_route(State(state_with(None))).await;
        assert_eq!(info.name, "Solace");
        assert_eq!(info.emotions.len(), 5);
        assert_eq!(info.topics, KnowledgeBase::builtin().topics.len());
    }
}
