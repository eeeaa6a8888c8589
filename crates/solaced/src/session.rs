//! In-memory session store
//!
//! Sessions live for the lifetime of the daemon. Transcripts and ratings are
//! held behind a tokio RwLock keyed by session id; emotion counters are kept
//! separately by the tone adapter.

use chrono::{DateTime, Utc};
use solace_common::ChatMessage;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
    pub rating: Option<u8>,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            messages: Vec::new(),
            rating: None,
        }
    }
}

#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session seeded with the bot's greeting.
    pub async fn create(&self, greeting: ChatMessage) -> Session {
        let mut session = Session::new();
        session.messages.push(greeting);
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).cloned()
    }

    pub async fn exists(&self, id: Uuid) -> bool {
        let sessions = self.sessions.read().await;
        sessions.contains_key(&id)
    }

    /// Append a message to an existing session. Returns false when the
    /// session is unknown.
    pub async fn add_message(&self, id: Uuid, message: ChatMessage) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) => {
                session.messages.push(message);
                true
            }
            None => false,
        }
    }

    /// Record a 1-5 star rating. Returns false for unknown sessions or
    /// out-of-range values.
    pub async fn set_rating(&self, id: Uuid, rating: u8) -> bool {
        if !(1..=5).contains(&rating) {
            return false;
        }
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) => {
                session.rating = Some(rating);
                true
            }
            None => false,
        }
    }

    pub async fn count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeting() -> ChatMessage {
        ChatMessage::bot("Hello! How can I help you today?", false)
    }

    #[tokio::test]
    async fn test_create_seeds_greeting() {
        let manager = SessionManager::new();
        let session = manager.create(greeting()).await;
        let stored = manager.get(session.id).await.unwrap();
        assert_eq!(stored.messages.len(), 1);
        assert!(stored.rating.is_none());
    }

    #[tokio::test]
    async fn test_add_message_to_unknown_session_fails() {
        let manager = SessionManager::new();
        assert!(!manager.add_message(Uuid::new_v4(), greeting()).await);
    }

    #[tokio::test]
    async fn test_rating_range_enforced() {
        let manager = SessionManager::new();
        let session = manager.create(greeting()).await;
        assert!(!manager.set_rating(session.id, 0).await);
        assert!(!manager.set_rating(session.id, 6).await);
        assert!(manager.set_rating(session.id, 4).await);
        assert_eq!(manager.get(session.id).await.unwrap().rating, Some(4));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let manager = SessionManager::new();
        let a = manager.create(greeting()).await;
        let b = manager.create(greeting()).await;
        manager.add_message(a.id, ChatMessage::bot("only in a", false)).await;
        assert_eq!(manager.get(a.id).await.unwrap().messages.len(), 2);
        assert_eq!(manager.get(b.id).await.unwrap().messages.len(), 1);
        assert_eq!(manager.count().await, 2);
    }
}
