//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::rag::ChatHistory;
use crate::rag::PipelineResponse;
use crate::rag::SourceDocument;
use crate::surface::Transcript;

/// Failure body shared by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `POST /api/chat` body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Raw user text already carrying its `City:` qualifier
    #[serde(default)]
    pub question: Option<String>,
    /// Prior `[question, answer]` pairs; used only when chat history is enabled
    #[serde(default)]
    pub history: ChatHistory,
}

/// `POST /api/chat` success body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub text: String,
    pub source_documents: Vec<SourceDocument>,
}

impl From<PipelineResponse> for ChatResponse {
    fn from(response: PipelineResponse) -> Self {
        Self {
            text: response.answer,
            source_documents: response.source_documents,
        }
    }
}

/// `POST /api/sessions/:id/chat` body: the two form fields
#[derive(Debug, Deserialize)]
pub struct SessionChatRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub city: String,
}

/// Session snapshot returned by the session endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub cities: Vec<String>,
    pub transcript: Transcript,
}
