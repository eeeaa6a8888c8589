//! Completion backend client
//!
//! Trait abstraction over the remote LLM so the emotion pipeline can be
//! tested deterministically with scripted replies. Production code uses
//! `OllamaBackend` against an Ollama-compatible /api/chat endpoint; tests use
//! `ScriptedBackend` with pre-queued responses.
//!
//! A failed call is reported to the caller as an error and never retried;
//! every consumer treats it as "fallback absent".

use anyhow::{Context, Result};
use async_trait::async_trait;
use solace_common::{ChatMessagePart, ChatRequest, ChatResponse, LlmConfig};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Minimal interface the pipeline needs from a completion backend
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// One blocking completion round-trip. One suspend point, no partial
    /// results.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Cheap liveness probe
    async fn is_available(&self) -> bool;
}

// ============================================================================
// Ollama Backend (Production)
// ============================================================================

/// HTTP client for an Ollama-compatible chat endpoint
pub struct OllamaBackend {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    keep_alive: String,
}

impl OllamaBackend {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            keep_alive: config.keep_alive.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessagePart::system(system_prompt),
                ChatMessagePart::user(user_prompt),
            ],
            stream: false,
            keep_alive: Some(self.keep_alive.clone()),
        };

        debug!(
            "LLM call [{}]: system {} chars, user {} chars",
            self.model,
            system_prompt.len(),
            user_prompt.len()
        );

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to completion backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Completion backend returned {}: {}", status, error_text);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse completion backend response")?;

        debug!(
            "LLM response [{}]: {} chars",
            self.model,
            chat_response.message.content.len()
        );

        Ok(chat_response.message.content)
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.http_client.get(&url).send().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Completion backend unreachable: {}", e);
                false
            }
        }
    }
}

// ============================================================================
// Scripted Backend (Testing)
// ============================================================================

/// Backend that replays pre-queued replies and records prompts.
///
/// `Err` entries simulate transport failures; an empty queue behaves like an
/// unreachable backend.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<(String, String)>>,
    available: bool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
    }

    pub fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Prompts seen so far, as (system, user) pairs
    pub fn recorded_prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow::anyhow!("{}", message)),
            None => Err(anyhow::anyhow!("scripted backend exhausted")),
        }
    }

    async fn is_available(&self) -> bool {
        self.available
    }
}

/// Build the configured backend, or None when the LLM layer is disabled
pub fn backend_from_config(config: &LlmConfig) -> Option<std::sync::Arc<dyn LlmBackend>> {
    if !config.enabled {
        info!("Completion backend disabled by config, running retrieval-only");
        return None;
    }
    info!(
        "Completion backend: {} model {} (keep_alive {})",
        config.base_url, config.model, config.keep_alive
    );
    Some(std::sync::Arc::new(OllamaBackend::new(config)))
}
