//! RAG (Retrieval-Augmented Generation) module
//!
//! Two-stage conversational retrieval QA for talent recommendations:
//! - Query condensation (request + history -> standalone characteristic list)
//! - Context retrieval from the similarity-search index
//! - Structured answer generation over the retrieved profiles
//!
//! # Examples
//!
//! ```rust,no_run
//! use eventpulse::config::AppConfig;
//! use eventpulse::rag::PipelineRequest;
//! use eventpulse::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::new(&config)?;
//!
//!     let request = PipelineRequest::new("Need a guitarist for a wedding. City: Sydney");
//!     let response = service.run(request).await?.into_response();
//!     println!("Answer: {}", response.answer);
//!     println!("Sources: {} profiles", response.source_documents.len());
//!
//!     Ok(())
//! }
//! ```

pub mod condenser;
pub mod context;
pub mod generator;
pub mod pipeline;
pub mod retriever;

#[cfg(test)]
pub(crate) mod testing;

pub use condenser::CondensedQuery;
pub use condenser::QueryCondenser;
pub use context::AssembledContext;
pub use context::ContextAssembler;
pub use generator::AnswerGenerator;
pub use pipeline::PipelineOutcome;
pub use pipeline::PipelineState;
pub use pipeline::RagService;
pub use retriever::Retriever;

use serde::Deserialize;
use serde::Serialize;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One exchange unit in the transcript; never mutated after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_documents: Option<Vec<SourceDocument>>,
}

impl Turn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            source_documents: None,
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>, source_documents: Vec<SourceDocument>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            source_documents: Some(source_documents),
        }
    }
}

/// Origin metadata attached to a retrieved fragment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub source: String,
    /// Any other metadata stored alongside the vector
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A retrieved context fragment, passed through untouched to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    pub page_content: String,
    pub metadata: DocumentMetadata,
}

impl SourceDocument {
    #[must_use]
    pub fn new(page_content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: DocumentMetadata {
                source: source.into(),
                extra: serde_json::Map::new(),
            },
        }
    }
}

/// Prior `(question, answer)` exchanges, oldest first
///
/// Values are never mutated in place: [`ChatHistory::appended`] returns a new
/// history so each pipeline invocation owns the snapshot it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatHistory(Vec<(String, String)>);

impl ChatHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// New history with one more exchange at the end
    #[must_use]
    pub fn appended(&self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        let mut exchanges = self.0.clone();
        exchanges.push((question.into(), answer.into()));
        Self(exchanges)
    }

    /// Keep only the most recent `max` exchanges
    #[must_use]
    pub fn last(&self, max: usize) -> Self {
        let skip = self.0.len().saturating_sub(max);
        Self(self.0[skip..].to_vec())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.0.iter()
    }

    /// Render as `Human:` / `Assistant:` lines for the condense prompt
    #[must_use]
    pub fn render(&self) -> String {
        self.0
            .iter()
            .map(|(q, a)| format!("Human: {q}\nAssistant: {a}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<(String, String)>> for ChatHistory {
    fn from(exchanges: Vec<(String, String)>) -> Self {
        Self(exchanges)
    }
}

/// Input to one pipeline invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequest {
    pub question: String,
    #[serde(default)]
    pub chat_history: ChatHistory,
}

impl PipelineRequest {
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            chat_history: ChatHistory::new(),
        }
    }

    #[must_use]
    pub fn with_history(mut self, chat_history: ChatHistory) -> Self {
        self.chat_history = chat_history;
        self
    }
}

/// Final answer plus the documents that informed it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResponse {
    pub answer: String,
    pub source_documents: Vec<SourceDocument>,
}
