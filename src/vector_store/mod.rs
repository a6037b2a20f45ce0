//! Similarity-search backends
//!
//! The retriever depends only on [`SimilaritySearch`]; [`PineconeStore`] is the
//! hosted implementation used in production.

pub mod pinecone;

use async_trait::async_trait;

pub use pinecone::PineconeStore;

use crate::errors::Result;
use crate::rag::SourceDocument;

/// Query-by-text access to an index of talent profiles
///
/// Results come back most-similar first and never exceed `k`. An empty vector
/// is a valid "no matches" answer; transport and service failures are
/// [`crate::EventPulseError::RetrievalUnavailable`].
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SourceDocument>>;
}
