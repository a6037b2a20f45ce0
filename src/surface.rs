//! Interaction surface: request composition and the running transcript
//!
//! Rendering-agnostic; the CLI prints it and the HTTP session endpoints
//! serialize it.

use serde::Deserialize;
use serde::Serialize;

use crate::config::SurfaceConfig;
use crate::errors::EventPulseError;
use crate::errors::Result;
use crate::rag::ChatHistory;
use crate::rag::PipelineResponse;
use crate::rag::Role;
use crate::rag::Turn;

/// Qualifier appended to every question before it reaches the pipeline
pub const CITY_QUALIFIER: &str = "City:";

/// Validates user input and composes the pipeline question
#[derive(Debug, Clone)]
pub struct RequestComposer {
    cities: Vec<String>,
    max_query_chars: usize,
}

impl RequestComposer {
    #[must_use]
    pub fn new(config: &SurfaceConfig) -> Self {
        Self {
            cities: config.cities.clone(),
            max_query_chars: config.max_query_chars,
        }
    }

    /// Cities offered by the selector
    #[must_use]
    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    /// Match a city case-insensitively against the selector options
    #[must_use]
    pub fn resolve_city(&self, city: &str) -> Option<&str> {
        let wanted = city.trim();
        self.cities
            .iter()
            .find(|c| c.eq_ignore_ascii_case(wanted))
            .map(String::as_str)
    }

    /// Build `"<query> City: <city>"`
    ///
    /// # Errors
    /// `MalformedRequest` when the query is blank or too long, or the city is
    /// missing or not one of the selector options.
    pub fn compose(&self, query: &str, city: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() || city.trim().is_empty() {
            return Err(EventPulseError::MalformedRequest(
                "Please input a question and a location".to_string(),
            ));
        }
        if query.chars().count() > self.max_query_chars {
            return Err(EventPulseError::MalformedRequest(format!(
                "Question exceeds {} characters",
                self.max_query_chars
            )));
        }
        let city = self.resolve_city(city).ok_or_else(|| {
            EventPulseError::MalformedRequest(format!(
                "Unknown city '{}'; choose one of: {}",
                city.trim(),
                self.cities.join(", ")
            ))
        })?;

        Ok(format!("{query} {CITY_QUALIFIER} {city}"))
    }
}

/// Check a pre-composed question at the HTTP boundary
///
/// # Errors
/// `MalformedRequest` when the question is blank or lacks a non-empty
/// `City:` qualifier.
pub fn validate_question(question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        return Err(EventPulseError::MalformedRequest(
            "question is required".to_string(),
        ));
    }
    match question.rfind(CITY_QUALIFIER) {
        Some(idx) if !question[idx + CITY_QUALIFIER.len()..].trim().is_empty() => Ok(()),
        _ => Err(EventPulseError::MalformedRequest(
            "question must end with a 'City: <city>' qualifier".to_string(),
        )),
    }
}

/// Ordered user/assistant turns for one session, plus the current error region
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    turns: Vec<Turn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default)]
    waiting: bool,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Message shown in the error region, if the last request failed
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True between [`Transcript::begin_request`] and its completion
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Mark a request in flight and clear the previous error
    ///
    /// # Errors
    /// `RequestInProgress` while an earlier request has not completed; input
    /// stays blocked until [`Transcript::record_success`] or
    /// [`Transcript::record_failure`].
    pub fn begin_request(&mut self) -> Result<()> {
        if self.is_waiting() {
            return Err(EventPulseError::RequestInProgress(
                "wait for the current response before sending another request".to_string(),
            ));
        }
        self.error = None;
        self.waiting = true;
        Ok(())
    }

    /// Append the user turn and the assistant turn with its sources
    pub fn record_success(&mut self, question: &str, response: PipelineResponse) {
        self.waiting = false;
        self.turns.push(Turn::user(question));
        self.turns
            .push(Turn::assistant(response.answer, response.source_documents));
    }

    /// Show `message` in the error region; turns are left unchanged
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.waiting = false;
        self.error = Some(message.into());
    }

    /// Completed user/assistant pairs, oldest first
    #[must_use]
    pub fn history(&self) -> ChatHistory {
        let exchanges: Vec<(String, String)> = self
            .turns
            .windows(2)
            .filter(|w| w[0].role == Role::User && w[1].role == Role::Assistant)
            .map(|w| (w[0].text.clone(), w[1].text.clone()))
            .collect();
        ChatHistory::from(exchanges)
    }
}
