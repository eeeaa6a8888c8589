//! Static knowledge base with keyword topic matching
//!
//! Topic dictionaries back the keyword retriever and the deterministic
//! fallback answers used when the completion backend is unavailable. A
//! custom knowledge base can be loaded from TOML; the built-in one covers
//! the fuel-card support domain the assistant ships with.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One topic: trigger keywords plus the snippets that answer it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbTopic {
    pub name: String,
    pub keywords: Vec<String>,
    pub documents: Vec<String>,
    /// Language tag for retrieval filtering
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// Keyword-indexed knowledge base
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub topics: Vec<KbTopic>,
    /// Terms that mark a question as in-domain
    pub domain_keywords: Vec<String>,
    /// Terms that mark the user as wrapping up the conversation
    pub closing_keywords: Vec<String>,
    /// Answer used when retrieval comes back empty
    pub capabilities_answer: String,
}

impl KnowledgeBase {
    /// Load a knowledge base from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge base {}", path.display()))?;
        let kb: KnowledgeBase = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse knowledge base {}", path.display()))?;
        info!("Knowledge base loaded: {} topics", kb.topics.len());
        Ok(kb)
    }

    /// Built-in fuel-card support knowledge base
    pub fn builtin() -> Self {
        let topic = |name: &str, keywords: &[&str], documents: &[&str]| KbTopic {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            documents: documents.iter().map(|d| d.to_string()).collect(),
            language: "en".to_string(),
        };

        Self {
            topics: vec![
                topic(
                    "general",
                    &["solace", "what is", "service", "about", "fuel card"],
                    &[
                        "Solace is a smart fuel payment service for petrol stations",
                        "It lets you pay for fuel with a physical card or the companion mobile app",
                        "Solace replaced the old paper voucher system with a digital solution",
                        "It serves both individual and corporate customers for fuel spending control",
                    ],
                ),
                topic(
                    "app",
                    &["app", "mobile", "digital", "recharge", "pay", "apple", "android", "download"],
                    &[
                        "The companion app is available on the Apple App Store and Google Play",
                        "The app lets you top up your account digitally without visiting a branch",
                        "You can pay directly at refueling stations from the app",
                        "No physical card is needed when you pay through the app",
                    ],
                ),
                topic(
                    "topup",
                    &["top up", "topup", "recharge", "balance", "add money", "website", "online"],
                    &[
                        "You can top up your account through the mobile app",
                        "Cards can also be topped up via the official website",
                        "Top-ups are instant and the credit is usable immediately",
                        "Transaction history and balance are available online",
                    ],
                ),
                topic(
                    "fees",
                    &["fee", "cost", "charge", "price", "how much", "issuance", "renewal"],
                    &[
                        "Card issuance and replacement fee: BD 3.300",
                        "Annual renewal fee: BD 2.200, deducted automatically from the balance",
                        "Amendment of card restrictions (vehicle plate, limits): BD 1.100",
                        "The card is valid for 3 years",
                    ],
                ),
                topic(
                    "features",
                    &["feature", "benefit", "offer", "control", "limit", "restriction"],
                    &[
                        "Secure cash-free fuel transactions",
                        "Fuel type restrictions can be set per card",
                        "Vehicle-specific limits using license plate numbers",
                        "Household or fleet fuel consumption managed under one account",
                    ],
                ),
                topic(
                    "formats",
                    &["format", "prepaid", "credit", "type", "card"],
                    &[
                        "The card is available as Prepaid for individuals and companies",
                        "A Credit format is available for qualified corporate customers",
                        "Both formats offer the same security and management features",
                    ],
                ),
            ],
            domain_keywords: [
                "solace", "fuel", "card", "fee", "feature", "restriction", "format",
                "prepaid", "credit", "apply", "how much", "cost", "charge", "what",
                "how", "use", "get", "vehicle", "limit", "work", "available", "app",
                "mobile", "download", "balance", "top up", "recharge",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            closing_keywords: [
                "thanks", "thank you", "thx", "bye", "goodbye", "see you", "great",
                "helpful", "done",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            capabilities_answer: "I'm the Solace assistant! I can help with questions about \
                card features, fees, how to apply, restrictions, the mobile app, and more. \
                What would you like to know?"
                .to_string(),
        }
    }

    /// Rank topics by keyword hits and return up to `k` snippets for the
    /// requested language. Empty result is valid.
    pub fn search(&self, query: &str, k: usize, language: &str) -> Vec<String> {
        let query_lower = query.to_lowercase();

        let mut scored: Vec<(usize, &KbTopic)> = self
            .topics
            .iter()
            .filter(|topic| topic.language == language)
            .map(|topic| {
                let hits = topic
                    .keywords
                    .iter()
                    .filter(|keyword| query_lower.contains(keyword.as_str()))
                    .count();
                (hits, topic)
            })
            .filter(|(hits, _)| *hits > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .iter()
            .flat_map(|(_, topic)| topic.documents.iter().cloned())
            .take(k)
            .collect()
    }

    /// Whether the question falls inside the supported domain
    pub fn is_domain_question(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        self.domain_keywords
            .iter()
            .any(|keyword| query_lower.contains(keyword.as_str()))
    }

    /// Whether the user is ending the conversation (triggers rating request)
    pub fn is_closing_intent(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        self.closing_keywords
            .iter()
            .any(|keyword| query_lower.contains(keyword.as_str()))
    }

    /// Build a deterministic answer from retrieved snippets. Used when the
    /// completion backend is absent or failed.
    pub fn build_fallback_answer(&self, snippets: &[String]) -> String {
        if snippets.is_empty() {
            return self.capabilities_answer.clone();
        }

        let mut answer = snippets[0].clone();
        if !answer.ends_with('.') {
            answer.push('.');
        }

        if snippets.len() > 1 {
            let mut second = snippets[1].clone();
            if let Some(first_char) = second.chars().next() {
                if first_char.is_uppercase() {
                    second = first_char.to_lowercase().collect::<String>() + &second[first_char.len_utf8()..];
                }
            }
            answer.push_str(&format!(" Additionally, {}", second));
            if !answer.ends_with('.') {
                answer.push('.');
            }
        }

        if snippets.len() > 2 {
            answer.push_str(&format!(" Also worth noting: {}", snippets[2]));
        }

        answer
    }
}
