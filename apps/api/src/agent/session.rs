//! Session store — the one shared-mutable-state point in the service.
//!
//! Two-level locking: the outer map lock makes lookup-or-create atomic (two
//! concurrent first-turns for a session id cannot create divergent
//! sessions); the inner per-session lock serializes turns for one session
//! while leaving other sessions fully independent. Sessions live for the
//! process lifetime unless explicitly evicted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::agent::reasoning::ReasoningLoop;
use crate::chunking::estimate_tokens;

/// History budget per session, in estimated tokens. Oldest turns are evicted
/// first once the budget is exceeded.
pub const MEMORY_TOKEN_LIMIT: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One conversation turn. Append-only once recorded.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Conversational state for one `session_id`: bounded history plus the
/// lazily created reasoning loop. Never shared across session ids.
pub struct Session {
    history: Vec<ChatTurn>,
    token_budget: usize,
    reasoner: Option<ReasoningLoop>,
}

impl Session {
    fn new(token_budget: usize) -> Self {
        Self {
            history: Vec::new(),
            token_budget,
            reasoner: None,
        }
    }

    pub fn push_user(&mut self, content: &str) {
        self.push(Role::User, content);
    }

    pub fn push_assistant(&mut self, content: &str) {
        self.push(Role::Assistant, content);
    }

    fn push(&mut self, role: Role, content: &str) {
        self.history.push(ChatTurn {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
        self.trim();
    }

    /// Evict oldest turns until the history fits the token budget. The most
    /// recent turn always survives, even if it alone exceeds the budget.
    fn trim(&mut self) {
        let mut total: usize = self
            .history
            .iter()
            .map(|t| estimate_tokens(&t.content))
            .sum();
        while total > self.token_budget && self.history.len() > 1 {
            let evicted = self.history.remove(0);
            total -= estimate_tokens(&evicted.content);
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.history
    }

    /// History rendered for prompt inclusion, oldest first.
    pub fn history_block(&self) -> String {
        if self.history.is_empty() {
            return "(no prior conversation)".to_string();
        }
        self.history
            .iter()
            .map(|t| format!("{}: {}", t.role.as_str(), t.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The session's reasoning loop, created on first use.
    pub fn reasoner(&mut self, create: impl FnOnce() -> ReasoningLoop) -> &ReasoningLoop {
        self.reasoner.get_or_insert_with(create)
    }
}

/// Concurrency-safe mapping from session id to session, injected into the
/// router at construction. Teardown is an explicit operation.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
    token_budget: usize,
}

impl SessionStore {
    pub fn new(token_budget: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            token_budget,
        }
    }

    /// Atomic lookup-or-create for a session id.
    pub async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                info!("Created new agent session: {session_id}");
                Arc::new(Mutex::new(Session::new(self.token_budget)))
            })
            .clone()
    }

    /// Evict a session. Returns whether it existed; evicting an unknown id
    /// is not an error.
    pub async fn remove(&self, session_id: &str) -> bool {
        let existed = self.sessions.lock().await.remove(session_id).is_some();
        if existed {
            info!("Session cleared: {session_id}");
        }
        existed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let store = SessionStore::new(MEMORY_TOKEN_LIMIT);
        let a = store.get_or_create("s1").await;
        let b = store.get_or_create("s1").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new(MEMORY_TOKEN_LIMIT);
        let a = store.get_or_create("alice").await;
        let b = store.get_or_create("bob").await;

        a.lock().await.push_user("my secret question");
        assert!(b.lock().await.turns().is_empty());
        assert!(!b.lock().await.history_block().contains("secret"));
    }

    #[tokio::test]
    async fn test_concurrent_first_turns_create_one_session() {
        let store = Arc::new(SessionStore::new(MEMORY_TOKEN_LIMIT));
        let (s1, s2) = tokio::join!(store.get_or_create("race"), store.get_or_create("race"));
        assert!(Arc::ptr_eq(&s1, &s2));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = SessionStore::new(MEMORY_TOKEN_LIMIT);
        store.get_or_create("gone").await;
        assert!(store.remove("gone").await);
        assert!(!store.remove("gone").await);
        assert!(!store.remove("never-existed").await);
    }

    #[tokio::test]
    async fn test_history_trimmed_to_token_budget() {
        // Budget of 25 estimated tokens = 100 chars
        let store = SessionStore::new(25);
        let session = store.get_or_create("tight").await;
        let mut guard = session.lock().await;

        for i in 0..10 {
            guard.push_user(&format!("turn number {i} with some padding text"));
        }
        let total: usize = guard
            .turns()
            .iter()
            .map(|t| estimate_tokens(&t.content))
            .sum();
        assert!(total <= 25);
        assert!(!guard.turns().is_empty());
        // Newest turn survives
        assert!(guard.turns().last().unwrap().content.contains("number 9"));
    }

    #[tokio::test]
    async fn test_single_oversized_turn_survives() {
        let store = SessionStore::new(10);
        let session = store.get_or_create("big").await;
        let mut guard = session.lock().await;
        guard.push_user(&"x".repeat(500));
        assert_eq!(guard.turns().len(), 1);
    }

    #[tokio::test]
    async fn test_history_block_ordering_and_roles() {
        let store = SessionStore::new(MEMORY_TOKEN_LIMIT);
        let session = store.get_or_create("fmt").await;
        let mut guard = session.lock().await;
        guard.push_user("hello");
        guard.push_assistant("hi there");

        let block = guard.history_block();
        let user_pos = block.find("user: hello").unwrap();
        let assistant_pos = block.find("assistant: hi there").unwrap();
        assert!(user_pos < assistant_pos);
    }

    #[tokio::test]
    async fn test_empty_history_block_placeholder() {
        let store = SessionStore::new(MEMORY_TOKEN_LIMIT);
        let session = store.get_or_create("empty").await;
        assert_eq!(
            session.lock().await.history_block(),
            "(no prior conversation)"
        );
    }
}
