//! Configuration for solaced
//!
//! Loads settings from /etc/solace/config.toml or uses defaults. Every field
//! carries a serde default so partial files work.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Default config file path
pub const CONFIG_PATH: &str = "/etc/solace/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Top-level daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolaceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub emotion: EmotionConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address; localhost only by default
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Completion backend base URL (Ollama-compatible)
    #[serde(default = "default_llm_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    /// How long the backend keeps the model loaded after a request
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,
    /// Disable to run retrieval-only with deterministic fallback answers
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionConfig {
    /// Minimum local-classifier confidence before the remote fallback runs
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Consult the remote LLM on low-confidence local results
    #[serde(default = "default_true")]
    pub remote_fallback: bool,
    /// Detection + generation in one remote call instead of the two-step
    /// detect -> adapt pipeline. Skips per-session frustration tracking.
    #[serde(default)]
    pub combined_generation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_analytics_path")]
    pub log_file: String,
    /// Hash user messages before logging for privacy
    #[serde(default)]
    pub hash_messages: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Optional TOML file overriding the built-in knowledge base
    #[serde(default)]
    pub path: Option<String>,
}

fn default_bind_addr() -> String {
    "127.0.0.1:7870".to_string()
}

fn default_assistant_name() -> String {
    "Solace".to_string()
}

fn default_llm_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_llm_model() -> String {
    "qwen3:4b".to_string()
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_keep_alive() -> String {
    "5m".to_string()
}

fn default_confidence_threshold() -> f64 {
    0.3
}

fn default_analytics_path() -> String {
    "/var/lib/solace/analytics.jsonl".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            assistant_name: default_assistant_name(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_url(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
            keep_alive: default_keep_alive(),
            enabled: true,
        }
    }
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            remote_fallback: true,
            combined_generation: false,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            log_file: default_analytics_path(),
            hash_messages: false,
            enabled: true,
        }
    }
}

impl SolaceConfig {
    /// Load config from a file, falling back to defaults when it is absent
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: SolaceConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        info!("Config loaded from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolaceConfig::default();
        assert_eq!(config.emotion.confidence_threshold, 0.3);
        assert!(config.emotion.remote_fallback);
        assert!(!config.emotion.combined_generation);
        assert_eq!(config.llm.keep_alive, "5m");
        assert!(config.analytics.enabled);
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let raw = r#"
            [emotion]
            confidence_threshold = 0.5
        "#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, raw).unwrap();

        let config = SolaceConfig::load(&path).unwrap();
        assert_eq!(config.emotion.confidence_threshold, 0.5);
        assert!(config.emotion.remote_fallback);
        assert_eq!(config.llm.model, "qwen3:4b");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = SolaceConfig::load(Path::new("/nonexistent/solace.toml")).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:7870");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(SolaceConfig::load(&path).is_err());
    }
}
