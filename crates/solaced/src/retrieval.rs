//! Snippet retrieval
//!
//! Retrieval is a trait seam so the chat pipeline can be exercised in tests
//! with a scripted retriever while production runs keyword matching over the
//! knowledge base.

use solace_common::KnowledgeBase;
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 3;

pub trait SnippetRetriever: Send + Sync {
    /// Return up to `k` documents relevant to `query`, best first.
    fn retrieve(&self, query: &str, k: usize, language: &str) -> Vec<String>;
}

/// Keyword-overlap retriever over the loaded knowledge base
pub struct KeywordRetriever {
    kb: Arc<KnowledgeBase>,
}

impl KeywordRetriever {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }
}

impl SnippetRetriever for KeywordRetriever {
    fn retrieve(&self, query: &str, k: usize, language: &str) -> Vec<String> {
        self.kb.search(query, k, language)
    }
}
