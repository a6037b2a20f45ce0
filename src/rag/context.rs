//! Context assembly from retrieved documents

use tracing::warn;

use crate::rag::SourceDocument;

/// Separator placed between document contents in the `{context}` slot
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

pub const DEFAULT_MAX_CONTEXT_LENGTH: usize = 32_000;

/// Prompt context plus exactly the documents that went into it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledContext {
    pub text: String,
    pub documents: Vec<SourceDocument>,
}

/// Assembler for creating the answer prompt's context from retrieved documents
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    max_context_length: usize,
}

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub const fn new(max_context_length: usize) -> Self {
        Self { max_context_length }
    }

    /// Concatenate document contents in retrieval order
    ///
    /// A document that would push the context past `max_context_length` bytes
    /// is left out, and so is absent from the returned documents; later,
    /// smaller documents are still considered. Zero documents give an empty context.
    #[must_use]
    pub fn assemble(&self, documents: Vec<SourceDocument>) -> AssembledContext {
        let mut assembled = AssembledContext::default();

        for doc in documents {
            let extra = if assembled.text.is_empty() {
                doc.page_content.len()
            } else {
                DOCUMENT_SEPARATOR.len() + doc.page_content.len()
            };
            if assembled.text.len() + extra > self.max_context_length {
                warn!(
                    "Skipping document {} ({} bytes) that exceeds the context budget",
                    doc.metadata.source,
                    doc.page_content.len()
                );
                continue;
            }

            if !assembled.text.is_empty() {
                assembled.text.push_str(DOCUMENT_SEPARATOR);
            }
            assembled.text.push_str(&doc.page_content);
            assembled.documents.push(doc);
        }

        assembled
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTEXT_LENGTH)
    }
}
