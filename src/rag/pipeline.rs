//! Complete RAG pipeline: Condense -> Retrieve -> Generate

use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::llm::GenerationParams;
use crate::llm::LlmService;
use crate::llm::TextGenerator;
use crate::rag::AnswerGenerator;
use crate::rag::CondensedQuery;
use crate::rag::ContextAssembler;
use crate::rag::PipelineRequest;
use crate::rag::PipelineResponse;
use crate::rag::QueryCondenser;
use crate::rag::Retriever;
use crate::vector_store::PineconeStore;
use crate::vector_store::SimilaritySearch;

/// Stage of a single pipeline invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Condensing,
    Retrieving,
    Generating,
    Done,
    Failed(String),
}

/// Successful end of an invocation
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Answered(PipelineResponse),
    /// Condensation found no talent request; retrieval never ran
    InvalidIntent,
}

impl PipelineOutcome {
    /// Collapse to the wire response; invalid intent becomes an empty answer with no sources
    #[must_use]
    pub fn into_response(self) -> PipelineResponse {
        match self {
            Self::Answered(response) => response,
            Self::InvalidIntent => PipelineResponse::default(),
        }
    }

    #[must_use]
    pub const fn is_invalid_intent(&self) -> bool {
        matches!(self, Self::InvalidIntent)
    }
}

/// Complete RAG service
///
/// Holds no per-request state: concurrent `run` calls share only the
/// immutable stage configuration and the external service clients.
pub struct RagService {
    condenser: QueryCondenser,
    retriever: Retriever,
    answer_generator: AnswerGenerator,
}

impl RagService {
    /// Create a new RAG service backed by the hosted LLM and vector index
    ///
    /// # Errors
    /// - Embedding service configuration errors (unknown provider)
    /// - HTTP client build errors
    pub fn new(config: &AppConfig) -> Result<Self> {
        let generator: Arc<dyn TextGenerator> = Arc::new(LlmService::new(config)?);
        let store: Arc<dyn SimilaritySearch> = Arc::new(PineconeStore::new(config)?);
        Ok(Self::from_services(generator, store, config))
    }

    /// Create from existing services
    #[must_use]
    pub fn from_services(
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn SimilaritySearch>,
        config: &AppConfig,
    ) -> Self {
        let params = GenerationParams {
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        };
        let condenser = QueryCondenser::new(generator.clone(), params).with_history(
            config.pipeline.use_chat_history,
            config.pipeline.max_history_turns,
        );
        let retriever = Retriever::new(store, config.vector_store.top_k);
        let answer_generator = AnswerGenerator::new(generator, params).with_context_assembler(
            ContextAssembler::new(config.pipeline.max_context_length),
        );

        Self {
            condenser,
            retriever,
            answer_generator,
        }
    }

    /// Run one request through condense, retrieve and generate
    ///
    /// # Errors
    /// - `MalformedRequest` for an empty question
    /// - `RetrievalUnavailable` if condensation or the similarity search fails
    /// - `GenerationUnavailable` if answer generation fails
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineOutcome> {
        self.run_traced(request).await.0
    }

    /// Like [`RagService::run`], also returning every state entered, in order
    pub async fn run_traced(
        &self,
        request: PipelineRequest,
    ) -> (Result<PipelineOutcome>, Vec<PipelineState>) {
        let mut states = Vec::with_capacity(4);
        let result = self.drive(&request, &mut states).await;

        if let Err(e) = &result {
            warn!("Pipeline failed: {}", e);
            states.push(PipelineState::Failed(e.to_string()));
        } else {
            states.push(PipelineState::Done);
        }
        (result, states)
    }

    async fn drive(
        &self,
        request: &PipelineRequest,
        states: &mut Vec<PipelineState>,
    ) -> Result<PipelineOutcome> {
        info!("Processing pipeline request: {}", request.question);

        states.push(PipelineState::Condensing);
        let query = match self
            .condenser
            .condense(&request.question, &request.chat_history)
            .await?
        {
            CondensedQuery::Query(query) => query,
            CondensedQuery::Invalid => {
                info!("No talent request found, skipping retrieval");
                return Ok(PipelineOutcome::InvalidIntent);
            }
        };
        debug!("Condensed query: {}", query);

        states.push(PipelineState::Retrieving);
        let documents = self.retriever.retrieve(&query).await?;
        debug!("Retrieved {} documents", documents.len());

        states.push(PipelineState::Generating);
        let response = self.answer_generator.generate(&query, documents).await?;

        info!(
            "Pipeline completed with {} sources",
            response.source_documents.len()
        );
        Ok(PipelineOutcome::Answered(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EventPulseError;
    use crate::llm::prompts::ANSWER_FIELDS;
    use crate::rag::testing::musician_profiles;
    use crate::rag::testing::RecordingStore;
    use crate::rag::testing::ScriptedGenerator;
    use crate::rag::ChatHistory;
    use crate::rag::SourceDocument;

    const STRUCTURED_ANSWER: &str = "Talent Name: Musician 1\n\nDescription: Acoustic guitarist\n\nLocation: Sydney\n\nAvailable for: Weddings\n\nSpecialist Topics: Folk, pop covers\n\nInterests: Songwriting\n\nPrice Per Hour: $120\n\nReasons for recommendation: Wedding experience in Sydney";

    fn service(
        generator: &Arc<ScriptedGenerator>,
        store: &Arc<RecordingStore>,
        config: &AppConfig,
    ) -> RagService {
        RagService::from_services(generator.clone(), store.clone(), config)
    }

    #[tokio::test]
    async fn test_guitarist_round_trip() {
        let generator = Arc::new(ScriptedGenerator::new(&[
            "guitarist, wedding experience, Sydney",
            STRUCTURED_ANSWER,
        ]));
        let store = Arc::new(RecordingStore::with_documents(musician_profiles(6)));
        let rag = service(&generator, &store, &AppConfig::default());

        let (result, states) = rag
            .run_traced(PipelineRequest::new(
                "Need a guitarist for a wedding. City: Sydney",
            ))
            .await;
        let response = result.unwrap().into_response();

        assert_eq!(
            states,
            vec![
                PipelineState::Condensing,
                PipelineState::Retrieving,
                PipelineState::Generating,
                PipelineState::Done
            ]
        );
        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.ends_with("Sydney"));
        assert!(response.source_documents.len() <= 4);
        assert!(response.source_documents[0].page_content.contains("guitarist"));
        for field in ANSWER_FIELDS {
            assert!(response.answer.contains(field), "missing {field}");
        }
        assert!(generator.prompts()[1].contains("Required characteristics:\nguitarist, wedding experience, Sydney"));
    }

    #[tokio::test]
    async fn test_invalid_intent_skips_retrieval() {
        let generator = Arc::new(ScriptedGenerator::new(&["invalid"]));
        let store = Arc::new(RecordingStore::with_documents(musician_profiles(2)));
        let rag = service(&generator, &store, &AppConfig::default());

        let (result, states) = rag
            .run_traced(PipelineRequest::new("What's the weather today? City: Perth"))
            .await;
        let outcome = result.unwrap();

        assert!(outcome.is_invalid_intent());
        assert_eq!(states, vec![PipelineState::Condensing, PipelineState::Done]);
        assert!(store.calls().is_empty());
        assert_eq!(generator.calls(), 1);

        let response = outcome.into_response();
        assert!(response.answer.is_empty());
        assert!(response.source_documents.is_empty());
    }

    #[tokio::test]
    async fn test_retrieval_failure_skips_generation() {
        let generator = Arc::new(ScriptedGenerator::new(&["drummer, Brisbane"]));
        let store = Arc::new(RecordingStore::failing("connection refused"));
        let rag = service(&generator, &store, &AppConfig::default());

        let (result, states) = rag
            .run_traced(PipelineRequest::new("Need a drummer City: Brisbane"))
            .await;

        assert!(matches!(
            result,
            Err(EventPulseError::RetrievalUnavailable(_))
        ));
        assert_eq!(states.len(), 3);
        assert_eq!(states[1], PipelineState::Retrieving);
        assert!(matches!(states[2], PipelineState::Failed(_)));
        // Only the condense call reached the generator
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_documents_still_generates() {
        let refusal = "I'm sorry, I am tuned to only answer questions that are related to the context.";
        let generator = Arc::new(ScriptedGenerator::new(&["fire dancer, Gold Coast", refusal]));
        let store = Arc::new(RecordingStore::with_documents(vec![]));
        let rag = service(&generator, &store, &AppConfig::default());

        let response = rag
            .run(PipelineRequest::new("Need a fire dancer City: Gold Coast"))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.answer, refusal);
        assert!(response.source_documents.is_empty());
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_generation_failure() {
        let generator = Arc::new(ScriptedGenerator::new(&["singer, Adelaide"]));
        generator.push_err("HTTP 500");
        let store = Arc::new(RecordingStore::with_documents(musician_profiles(1)));
        let rag = service(&generator, &store, &AppConfig::default());

        let (result, states) = rag
            .run_traced(PipelineRequest::new("Need a singer City: Adelaide"))
            .await;

        assert!(matches!(
            result,
            Err(EventPulseError::GenerationUnavailable(_))
        ));
        assert_eq!(states[2], PipelineState::Generating);
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_configured_top_k_respected() {
        let mut config = AppConfig::default();
        config.vector_store.top_k = 2;
        let generator = Arc::new(ScriptedGenerator::new(&["guitarist, Sydney", "ok"]));
        let store = Arc::new(RecordingStore::with_documents(musician_profiles(5)));

        let response = service(&generator, &store, &config)
            .run(PipelineRequest::new("guitarist City: Sydney"))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.source_documents.len(), 2);
        assert_eq!(store.calls()[0].1, 2);
    }

    #[tokio::test]
    async fn test_history_threaded_when_enabled() {
        let mut config = AppConfig::default();
        config.pipeline.use_chat_history = true;
        let generator = Arc::new(ScriptedGenerator::new(&["cheaper guitarist, Sydney", "ok"]));
        let store = Arc::new(RecordingStore::with_documents(musician_profiles(1)));
        let history = ChatHistory::new().appended("Need a guitarist City: Sydney", "Talent Name: Musician 1");

        let request = PipelineRequest::new("Someone cheaper? City: Sydney").with_history(history.clone());
        service(&generator, &store, &config).run(request).await.unwrap();

        assert!(generator.prompts()[0].contains("Human: Need a guitarist City: Sydney"));
        // The caller's history is untouched
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_sources_are_only_documents_in_context() {
        let generator = Arc::new(ScriptedGenerator::new(&["guitarist, Sydney", STRUCTURED_ANSWER]));
        let store = Arc::new(RecordingStore::with_documents(vec![
            SourceDocument::new("x".repeat(40_000), "talents/huge.md"),
            SourceDocument::new("Jane guitarist Sydney", "talents/jane.md"),
        ]));

        let response = service(&generator, &store, &AppConfig::default())
            .run(PipelineRequest::new("Need a guitarist City: Sydney"))
            .await
            .unwrap()
            .into_response();

        let answer_prompt = &generator.prompts()[1];
        assert!(answer_prompt.contains("Jane guitarist Sydney"));
        assert!(!answer_prompt.contains("xxxx"));
        assert_eq!(response.source_documents.len(), 1);
        assert_eq!(response.source_documents[0].metadata.source, "talents/jane.md");
    }
}
