//! HTTP server for solaced

use crate::analytics::AnalyticsLogger;
use crate::emotion::{
    EmotionClassifier, EmotionDetector, LexiconModel, LocalStrategy, RemoteEmotionFallback,
    RemoteStrategy,
};
use crate::llm::{self, LlmBackend};
use crate::response::{FrustrationTracker, ResponseGenerator, ToneAdapter};
use crate::retrieval::{KeywordRetriever, SnippetRetriever};
use crate::routes;
use crate::session::SessionManager;
use anyhow::Result;
use axum::Router;
use solace_common::{KnowledgeBase, SolaceConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    pub config: SolaceConfig,
    /// Shared completion backend, kept for the health liveness probe
    pub backend: Option<Arc<dyn LlmBackend>>,
    pub detector: EmotionDetector,
    pub adapter: ToneAdapter,
    pub generator: ResponseGenerator,
    pub retriever: Arc<dyn SnippetRetriever>,
    pub kb: Arc<KnowledgeBase>,
    pub sessions: SessionManager,
    pub analytics: AnalyticsLogger,
    pub start_time: Instant,
}

impl AppState {
    /// Wire the full pipeline from config: lexicon classifier, optional
    /// remote fallback, tone adapter and generator sharing one backend.
    pub fn from_config(config: SolaceConfig) -> Self {
        let backend = llm::backend_from_config(&config.llm);
        if backend.is_none() {
            warn!("LLM backend disabled, running with deterministic answers only");
        }

        let kb = Arc::new(load_knowledge_base(&config));
        let detector = build_detector(&config, backend.clone());
        let tracker = Arc::new(FrustrationTracker::new());
        let adapter = ToneAdapter::new(
            backend.clone(),
            tracker,
            config.server.assistant_name.clone(),
        );
        let generator = ResponseGenerator::new(
            backend.clone(),
            kb.clone(),
            config.server.assistant_name.clone(),
        );
        let retriever: Arc<dyn SnippetRetriever> = Arc::new(KeywordRetriever::new(kb.clone()));
        let analytics = AnalyticsLogger::new(&config.analytics);

        Self {
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
        }
    }
}

fn load_knowledge_base(config: &SolaceConfig) -> KnowledgeBase {
    match &config.knowledge_base.path {
        Some(path) => match KnowledgeBase::load(Path::new(path)) {
            Ok(kb) => {
                info!("Loaded knowledge base from {}", path);
                kb
            }
            Err(e) => {
                warn!("Failed to load knowledge base {}: {}, using built-in", path, e);
                KnowledgeBase::builtin()
            }
        },
        None => KnowledgeBase::builtin(),
    }
}

fn build_detector(config: &SolaceConfig, backend: Option<Arc<dyn LlmBackend>>) -> EmotionDetector {
    let classifier = EmotionClassifier::new(Box::new(LexiconModel));
    let mut strategies: Vec<Arc<dyn crate::emotion::DetectionStrategy>> =
        vec![Arc::new(LocalStrategy::new(classifier))];

    if config.emotion.remote_fallback {
        if let Some(backend) = backend {
            strategies.push(Arc::new(RemoteStrategy::new(RemoteEmotionFallback::new(
                backend,
            ))));
        }
    }

    EmotionDetector::new(strategies, config.emotion.confidence_threshold)
}

/// Run the HTTP server
pub async fn run(state: AppState) -> Result<()> {
    let addr = state.config.server.bind_addr.clone();
    let state = Arc::new(state);

    let app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::session_routes())
        .merge(routes::chat_routes())
        .merge(routes::analytics_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
