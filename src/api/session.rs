//! Session management for interactive chat

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::EventPulseError;
use crate::errors::Result;
use crate::rag::ChatHistory;
use crate::rag::PipelineResponse;
use crate::surface::Transcript;

/// Chat session data
#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    pub session_id: String,
    pub transcript: Transcript,
    pub created_at: i64,
    pub last_activity: i64,
}

impl ChatSession {
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        Self {
            session_id: Uuid::new_v4().to_string(),
            transcript: Transcript::new(),
            created_at: now,
            last_activity: now,
        }
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now().timestamp();
    }

    #[must_use]
    pub fn is_expired(&self, timeout_secs: u64) -> bool {
        let idle = Utc::now().timestamp() - self.last_activity;
        idle > i64::try_from(timeout_secs).unwrap_or(i64::MAX)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory session store with automatic cleanup
pub struct SessionManager {
    sessions: Arc<DashMap<String, ChatSession>>,
}

impl SessionManager {
    /// Create a manager; when called inside a tokio runtime, also starts the
    /// background task that drops idle sessions every minute
    #[must_use]
    pub fn new(session_timeout_secs: u64) -> Self {
        let sessions = Arc::new(DashMap::new());

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let sessions_clone = Arc::clone(&sessions);
            handle.spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Self::cleanup_expired_sessions(&sessions_clone, session_timeout_secs);
                }
            });
        }

        Self { sessions }
    }

    #[must_use]
    pub fn create_session(&self) -> ChatSession {
        let session = ChatSession::new();
        self.sessions
            .insert(session.session_id.clone(), session.clone());
        session
    }

    #[must_use]
    pub fn get_session(&self, session_id: &str) -> Option<ChatSession> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// Mark a request in flight and return the history snapshot to condense with
    ///
    /// # Errors
    /// `SessionNotFound` for an unknown id, `RequestInProgress` while the
    /// session's previous request is still running.
    pub fn begin_request(&self, session_id: &str) -> Result<ChatHistory> {
        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| EventPulseError::SessionNotFound(session_id.to_string()))?;
        session.transcript.begin_request()?;
        session.touch();
        Ok(session.transcript.history())
    }

    /// Append the exchange; returns the updated session
    pub fn record_success(
        &self,
        session_id: &str,
        question: &str,
        response: PipelineResponse,
    ) -> Option<ChatSession> {
        self.sessions.get_mut(session_id).map(|mut session| {
            session.touch();
            session.transcript.record_success(question, response);
            session.clone()
        })
    }

    /// Put `message` in the session's error region, leaving its turns alone
    pub fn record_failure(&self, session_id: &str, message: &str) {
        if let Some(mut session) = self.sessions.get_mut(session_id) {
            session.touch();
            session.transcript.record_failure(message);
        }
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn cleanup_expired_sessions(sessions: &DashMap<String, ChatSession>, timeout_secs: u64) {
        let expired: Vec<String> = sessions
            .iter()
            .filter(|entry| entry.value().is_expired(timeout_secs))
            .map(|entry| entry.key().clone())
            .collect();

        for session_id in expired {
            sessions.remove(&session_id);
            tracing::info!("Cleaned up expired session: {}", session_id);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(3600) // 1 hour timeout
    }
}
