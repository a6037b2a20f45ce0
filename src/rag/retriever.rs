//! Context retrieval over the talent profile index

use std::sync::Arc;

use tracing::debug;

use crate::errors::EventPulseError;
use crate::errors::Result;
use crate::rag::SourceDocument;
use crate::vector_store::SimilaritySearch;

/// Default number of documents fetched per query
pub const DEFAULT_TOP_K: usize = 4;

/// Fetches the top-K most relevant profiles for a condensed query
pub struct Retriever {
    store: Arc<dyn SimilaritySearch>,
    top_k: usize,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(store: Arc<dyn SimilaritySearch>, top_k: usize) -> Self {
        Self {
            store,
            top_k: top_k.max(1),
        }
    }

    #[must_use]
    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// Most similar documents first, at most `top_k` of them
    ///
    /// Zero matches is `Ok(vec![])`; every failure is `RetrievalUnavailable`.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SourceDocument>> {
        debug!("Performing similarity search: {}", query);

        let mut documents = self
            .store
            .similarity_search(query, self.top_k)
            .await
            .map_err(|e| match e {
                EventPulseError::RetrievalUnavailable(_) => e,
                other => EventPulseError::RetrievalUnavailable(other.to_string()),
            })?;

        documents.truncate(self.top_k);
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::testing::musician_profiles;
    use crate::rag::testing::RecordingStore;

    #[tokio::test]
    async fn test_retrieve_caps_at_top_k() {
        let store = Arc::new(RecordingStore::with_documents(musician_profiles(7)));
        let retriever = Retriever::new(store.clone(), DEFAULT_TOP_K);

        let docs = retriever.retrieve("guitarist, Sydney").await.unwrap();
        assert_eq!(docs.len(), 4);
        assert_eq!(docs[0].metadata.source, "talents/musician-1.md");
        assert_eq!(store.calls(), vec![("guitarist, Sydney".to_string(), 4)]);
    }

    #[tokio::test]
    async fn test_zero_matches_is_not_an_error() {
        let store = Arc::new(RecordingStore::with_documents(vec![]));
        let docs = Retriever::new(store, 4).retrieve("juggler").await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_retrieval_unavailable() {
        let store = Arc::new(RecordingStore::failing("connection reset"));
        let err = Retriever::new(store, 4).retrieve("juggler").await.unwrap_err();
        assert!(matches!(err, EventPulseError::RetrievalUnavailable(_)));
    }

    #[test]
    fn test_top_k_never_zero() {
        let store = Arc::new(RecordingStore::with_documents(vec![]));
        assert_eq!(Retriever::new(store, 0).top_k(), 1);
    }
}
