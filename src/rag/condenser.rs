//! Query condensation: request + history -> standalone search query

use std::sync::Arc;

use tracing::debug;

use crate::errors::EventPulseError;
use crate::errors::Result;
use crate::llm::prompts::INVALID_TOKEN;
use crate::llm::GenerationParams;
use crate::llm::RagPrompts;
use crate::llm::TextGenerator;
use crate::rag::ChatHistory;

/// Result of the condense stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CondensedQuery {
    /// Comma-separated characteristics, optionally ending in location and price range
    Query(String),
    /// The request had no talent-seeking intent
    Invalid,
}

impl CondensedQuery {
    /// Interpret raw model output
    ///
    /// The invalid marker is matched case-insensitively and tolerates quotes and
    /// a trailing period (`'invalid'`, `Invalid.`). Returns `None` for blank output.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let bare = trimmed.trim_matches(|c: char| c == '\'' || c == '"' || c == '.' || c == '`');
        if bare.trim().eq_ignore_ascii_case(INVALID_TOKEN) {
            return Some(Self::Invalid);
        }

        Some(Self::Query(trimmed.to_string()))
    }
}

/// Reduces a conversational request to a single similarity-search query
pub struct QueryCondenser {
    generator: Arc<dyn TextGenerator>,
    params: GenerationParams,
    use_history: bool,
    max_history_turns: usize,
}

impl QueryCondenser {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>, params: GenerationParams) -> Self {
        Self {
            generator,
            params,
            use_history: false,
            max_history_turns: 10,
        }
    }

    /// Thread up to `max_turns` prior exchanges into the condense prompt
    #[must_use]
    pub const fn with_history(mut self, enabled: bool, max_turns: usize) -> Self {
        self.use_history = enabled;
        self.max_history_turns = max_turns;
        self
    }

    /// Build the prompt sent to the generation service
    #[must_use]
    pub fn build_prompt(&self, question: &str, history: &ChatHistory) -> String {
        if self.use_history && !history.is_empty() {
            let rendered = history.last(self.max_history_turns).render();
            RagPrompts::condense_with_history()
                .render_pairs(&[("chat_history", rendered.as_str()), ("question", question)])
        } else {
            RagPrompts::condense().render_pairs(&[("question", question)])
        }
    }

    /// Condense `question` (already carrying its city qualifier)
    ///
    /// # Errors
    /// - `MalformedRequest` for a blank question
    /// - `RetrievalUnavailable` when the generation service fails or answers with
    ///   nothing, since no search query can be formed
    pub async fn condense(&self, question: &str, history: &ChatHistory) -> Result<CondensedQuery> {
        if question.trim().is_empty() {
            return Err(EventPulseError::MalformedRequest(
                "question must not be empty".to_string(),
            ));
        }

        debug!("Condensing request ({} prior exchanges)", history.len());
        let prompt = self.build_prompt(question.trim(), history);

        let raw = self
            .generator
            .generate(&prompt, self.params)
            .await
            .map_err(|e| EventPulseError::RetrievalUnavailable(format!("query condensation failed: {e}")))?;

        CondensedQuery::parse(&raw).ok_or_else(|| {
            EventPulseError::RetrievalUnavailable(
                "query condensation returned empty output".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::testing::ScriptedGenerator;

    fn condenser(generator: &Arc<ScriptedGenerator>) -> QueryCondenser {
        QueryCondenser::new(generator.clone(), GenerationParams::deterministic(256))
    }

    #[test]
    fn test_parse_invalid_variants() {
        for raw in ["invalid", "Invalid.", " 'invalid' ", "\"INVALID\"", "`invalid`\n"] {
            assert_eq!(CondensedQuery::parse(raw), Some(CondensedQuery::Invalid), "{raw}");
        }
    }

    #[test]
    fn test_parse_query_and_blank() {
        assert_eq!(
            CondensedQuery::parse("  guitarist, wedding experience, Sydney \n"),
            Some(CondensedQuery::Query(
                "guitarist, wedding experience, Sydney".to_string()
            ))
        );
        assert_eq!(CondensedQuery::parse("   "), None);
        // A list that merely mentions the word is still a query
        assert!(matches!(
            CondensedQuery::parse("invalid-friendly venue, Perth"),
            Some(CondensedQuery::Query(_))
        ));
    }

    #[tokio::test]
    async fn test_condense_returns_query() {
        let generator = Arc::new(ScriptedGenerator::new(&["guitarist, weddings, Sydney"]));
        let result = condenser(&generator)
            .condense("Need a guitarist for a wedding. City: Sydney", &ChatHistory::new())
            .await
            .unwrap();

        assert_eq!(
            result,
            CondensedQuery::Query("guitarist, weddings, Sydney".to_string())
        );
        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Request:\nNeed a guitarist for a wedding. City: Sydney"));
        assert_eq!(generator.params()[0].temperature, 0.0);
    }

    #[tokio::test]
    async fn test_condense_returns_invalid() {
        let generator = Arc::new(ScriptedGenerator::new(&["invalid"]));
        let result = condenser(&generator)
            .condense("What's the weather today? City: Perth", &ChatHistory::new())
            .await
            .unwrap();
        assert_eq!(result, CondensedQuery::Invalid);
    }

    #[tokio::test]
    async fn test_empty_question_is_malformed() {
        let generator = Arc::new(ScriptedGenerator::new(&[]));
        let err = condenser(&generator)
            .condense("  ", &ChatHistory::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EventPulseError::MalformedRequest(_)));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_is_retrieval_unavailable() {
        let generator = Arc::new(ScriptedGenerator::default());
        generator.push_err("connection refused");

        let err = condenser(&generator)
            .condense("Need a DJ. City: Perth", &ChatHistory::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EventPulseError::RetrievalUnavailable(_)));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_output_is_retrieval_unavailable() {
        let generator = Arc::new(ScriptedGenerator::new(&["\n"]));
        let err = condenser(&generator)
            .condense("Need a DJ. City: Perth", &ChatHistory::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EventPulseError::RetrievalUnavailable(_)));
    }

    #[test]
    fn test_history_only_used_when_enabled() {
        let generator = Arc::new(ScriptedGenerator::default());
        let history = ChatHistory::new()
            .appended("Need a singer. City: Perth", "Talent Name: Ann")
            .appended("Cheaper? City: Perth", "Talent Name: Bo");

        let plain = condenser(&generator).build_prompt("q", &history);
        assert!(!plain.contains("Conversation so far"));

        let threaded = condenser(&generator)
            .with_history(true, 1)
            .build_prompt("q", &history);
        assert!(threaded.contains("Conversation so far:\nHuman: Cheaper? City: Perth"));
        assert!(!threaded.contains("Need a singer"));
    }
}
