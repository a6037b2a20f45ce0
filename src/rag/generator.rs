//! Answer generation over retrieved talent profiles

use std::sync::Arc;

use tracing::debug;

use crate::errors::EventPulseError;
use crate::errors::Result;
use crate::llm::GenerationParams;
use crate::llm::RagPrompts;
use crate::llm::TextGenerator;
use crate::rag::ContextAssembler;
use crate::rag::PipelineResponse;
use crate::rag::SourceDocument;

/// Produces the structured recommendation text
///
/// The eight labeled fields are requested from the model, not checked here.
pub struct AnswerGenerator {
    generator: Arc<dyn TextGenerator>,
    params: GenerationParams,
    context_assembler: ContextAssembler,
}

impl AnswerGenerator {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>, params: GenerationParams) -> Self {
        Self {
            generator,
            params,
            context_assembler: ContextAssembler::default(),
        }
    }

    #[must_use]
    pub fn with_context_assembler(mut self, context_assembler: ContextAssembler) -> Self {
        self.context_assembler = context_assembler;
        self
    }

    /// Build prompt for LLM
    #[must_use]
    pub fn build_prompt(&self, question: &str, context: &str) -> String {
        RagPrompts::answer().render_pairs(&[("context", context), ("question", question)])
    }

    /// Generate the recommendation for `question` (the condensed query)
    ///
    /// The response's sources are the documents that made it into the prompt
    /// context. An empty `documents` list still goes to the model, whose
    /// instructions call for the "only answers questions related to the context"
    /// refusal.
    pub async fn generate(
        &self,
        question: &str,
        documents: Vec<SourceDocument>,
    ) -> Result<PipelineResponse> {
        let context = self.context_assembler.assemble(documents);
        debug!("Generating answer from {} documents", context.documents.len());
        let prompt = self.build_prompt(question, &context.text);

        let answer = self
            .generator
            .generate(&prompt, self.params)
            .await
            .map_err(|e| match e {
                EventPulseError::GenerationUnavailable(_) => e,
                other => EventPulseError::GenerationUnavailable(other.to_string()),
            })?;

        Ok(PipelineResponse {
            answer,
            source_documents: context.documents,
        })
    }
}
