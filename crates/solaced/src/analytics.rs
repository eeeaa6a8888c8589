//! Emotion analytics log
//!
//! Every chat turn appends one JSON line to the analytics file. Logging is
//! best-effort: failures are reported through tracing and never surface to
//! the chat path. With `hash_messages` set, only a SHA-256 digest of the
//! user text is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use solace_common::{AnalyticsConfig, EmotionLabel, EmotionScores};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

/// One analytics record, serialized as a JSONL row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: Uuid,
    pub message: String,
    pub emotion: EmotionLabel,
    pub confidence: f64,
    pub scores: EmotionScores,
    pub response_time_ms: u64,
}

/// Per-label counts plus totals over the logged records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionStatistics {
    pub total_messages: usize,
    pub counts: HashMap<String, usize>,
    pub average_confidence: f64,
}

pub struct AnalyticsLogger {
    path: PathBuf,
    hash_messages: bool,
    enabled: bool,
    // serializes appends so concurrent turns never interleave lines
    write_lock: Mutex<()>,
}

impl AnalyticsLogger {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            path: PathBuf::from(&config.log_file),
            hash_messages: config.hash_messages,
            enabled: config.enabled,
            write_lock: Mutex::new(()),
        }
    }

    /// Append one record. Never fails the caller.
    pub fn record(
        &self,
        session_id: Uuid,
        message: &str,
        emotion: EmotionLabel,
        confidence: f64,
        scores: EmotionScores,
        response_time_ms: u64,
    ) {
        if !self.enabled {
            return;
        }

        let stored_message = if self.hash_messages {
            let digest = Sha256::digest(message.as_bytes());
            format!("sha256:{:x}", digest)
        } else {
            message.to_string()
        };

        let record = EmotionRecord {
            timestamp: Utc::now(),
            session_id,
            message: stored_message,
            emotion,
            confidence,
            scores,
            response_time_ms,
        };

        if let Err(e) = self.append(&record) {
            warn!("Failed to write analytics record: {}", e);
        }
    }

    fn append(&self, record: &EmotionRecord) -> anyhow::Result<()> {
        let line = serde_json::to_string(record)?;
        let _guard = self.write_lock.lock().unwrap();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    fn load_records(&self) -> Vec<EmotionRecord> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping malformed analytics line: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Aggregate counts, optionally restricted to one session.
    pub fn emotion_statistics(&self, session_id: Option<Uuid>) -> EmotionStatistics {
        let records: Vec<EmotionRecord> = self
            .load_records()
            .into_iter()
            .filter(|record| session_id.map_or(true, |id| record.session_id == id))
            .collect();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for label in EmotionLabel::ALL {
            counts.insert(label.as_str().to_string(), 0);
        }
        let mut confidence_sum = 0.0;
        for record in &records {
            *counts.entry(record.emotion.as_str().to_string()).or_insert(0) += 1;
            confidence_sum += record.confidence;
        }

        let average_confidence = if records.is_empty() {
            0.0
        } else {
            confidence_sum / records.len() as f64
        };

        EmotionStatistics {
            total_messages: records.len(),
            counts,
            average_confidence,
        }
    }

    /// The most recent `limit` records, newest last.
    pub fn recent(&self, limit: usize) -> Vec<EmotionRecord> {
        let records = self.load_records();
        let skip = records.len().saturating_sub(limit);
        records.into_iter().skip(skip).collect()
    }
}
