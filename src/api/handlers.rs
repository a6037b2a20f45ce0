//! API request handlers

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::api::error::ApiError;
use crate::api::session::ChatSession;
use crate::api::session::SessionManager;
use crate::api::types::*;
use crate::config::AppConfig;
use crate::errors::EventPulseError;
use crate::rag::ChatHistory;
use crate::rag::PipelineRequest;
use crate::rag::RagService;
use crate::surface::validate_question;
use crate::surface::RequestComposer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rag_service: Arc<RagService>,
    pub sessions: Arc<SessionManager>,
    pub composer: Arc<RequestComposer>,
    pub use_chat_history: bool,
}

impl AppState {
    #[must_use]
    pub fn new(rag_service: Arc<RagService>, config: &AppConfig) -> Self {
        Self {
            rag_service,
            sessions: Arc::new(SessionManager::new(config.server.session_timeout_secs)),
            composer: Arc::new(RequestComposer::new(&config.surface)),
            use_chat_history: config.pipeline.use_chat_history,
        }
    }

    fn effective_history(&self, history: ChatHistory) -> ChatHistory {
        if self.use_chat_history {
            history
        } else {
            ChatHistory::new()
        }
    }
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Stateless chat (POST /api/chat)
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        ApiError::from(EventPulseError::MalformedRequest(e.body_text()))
    })?;
    let question = req.question.unwrap_or_default();
    info!("POST /api/chat: {}", question);

    validate_question(&question)?;

    let request = PipelineRequest::new(question.trim())
        .with_history(state.effective_history(req.history));

    match state.rag_service.run(request).await {
        Ok(outcome) => Ok(Json(outcome.into_response().into())),
        Err(e) => {
            log_failure("chat request", &e);
            Err(e.into())
        }
    }
}

/// Create a session (POST /api/sessions)
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let session = state.sessions.create_session();
    info!("POST /api/sessions -> {}", session.session_id);
    (
        StatusCode::CREATED,
        Json(session_response(&state, session)),
    )
}

/// Get a session transcript (GET /api/sessions/:id)
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    info!("GET /api/sessions/{}", session_id);
    let session = state
        .sessions
        .get_session(&session_id)
        .ok_or(EventPulseError::SessionNotFound(session_id))?;
    Ok(Json(session_response(&state, session)))
}

/// Chat within a session (POST /api/sessions/:id/chat)
pub async fn session_chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<SessionChatRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        ApiError::from(EventPulseError::MalformedRequest(e.body_text()))
    })?;
    info!("POST /api/sessions/{}/chat", session_id);

    if state.sessions.get_session(&session_id).is_none() {
        return Err(EventPulseError::SessionNotFound(session_id).into());
    }

    // Bad input is reported without touching the transcript
    let question = state.composer.compose(&req.query, &req.city)?;

    let history = state.sessions.begin_request(&session_id)?;
    let request = PipelineRequest::new(question.clone())
        .with_history(state.effective_history(history));

    match state.rag_service.run(request).await {
        Ok(outcome) => {
            let session = state
                .sessions
                .record_success(&session_id, &question, outcome.into_response())
                .ok_or(EventPulseError::SessionNotFound(session_id))?;
            Ok(Json(session_response(&state, session)))
        }
        Err(e) => {
            log_failure("session chat", &e);
            state.sessions.record_failure(&session_id, &e.to_string());
            Err(e.into())
        }
    }
}

/// Upstream outages are errors on our side; anything else was the caller's input
fn log_failure(context: &str, e: &EventPulseError) {
    if e.is_upstream() {
        error!("Error processing {}: {}", context, e);
    } else {
        warn!("Rejected {}: {}", context, e);
    }
}

fn session_response(state: &AppState, session: ChatSession) -> SessionResponse {
    SessionResponse {
        session_id: session.session_id,
        cities: state.composer.cities().to_vec(),
        transcript: session.transcript,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::testing::musician_profiles;
    use crate::rag::testing::RecordingStore;
    use crate::rag::testing::ScriptedGenerator;

    fn state(generator: &Arc<ScriptedGenerator>) -> AppState {
        let config = AppConfig::default();
        let store = Arc::new(RecordingStore::with_documents(musician_profiles(2)));
        let rag_service = Arc::new(RagService::from_services(generator.clone(), store, &config));
        AppState::new(rag_service, &config)
    }

    fn request(query: &str) -> Result<Json<SessionChatRequest>, JsonRejection> {
        Ok(Json(SessionChatRequest {
            query: query.to_string(),
            city: "Sydney".to_string(),
        }))
    }

    #[tokio::test]
    async fn test_session_chat_conflicts_while_waiting() {
        let generator = Arc::new(ScriptedGenerator::new(&["guitarist, Sydney", "Talent Name: Jane"]));
        let state = state(&generator);
        let id = state.sessions.create_session().session_id;

        // A request from this session is already awaiting the pipeline
        state.sessions.begin_request(&id).unwrap();

        let err = session_chat(State(state.clone()), Path(id.clone()), request("Need a guitarist"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert!(generator.prompts().is_empty());

        let Json(snapshot) = get_session(State(state.clone()), Path(id.clone())).await.unwrap();
        assert!(snapshot.transcript.is_waiting());
        assert!(snapshot.transcript.turns().is_empty());

        state.sessions.record_failure(&id, "cancelled");
        let Json(snapshot) = session_chat(State(state), Path(id), request("Need a guitarist"))
            .await
            .unwrap();
        assert!(!snapshot.transcript.is_waiting());
        assert_eq!(snapshot.transcript.turns().len(), 2);
    }
}
