//! Top-K retrieval over the vector store

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::RetrievedChunk;

/// Embeds a query and returns the nearest stored chunks
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    collection: String,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever over `collection` returning up to `top_k` chunks
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        collection: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: collection.into(),
            top_k,
        }
    }

    /// Retrieve chunks for `query` in the order the store ranks them
    ///
    /// An empty result is `Ok`; only collaborator faults are errors.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>> {
        let embedding = self.embed_query(query).await?;
        self.search(&embedding).await
    }

    /// Embed the query text once
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embedder.embed(query).await
    }

    /// Run one similarity search with an embedded query
    pub async fn search(&self, embedding: &[f32]) -> Result<Vec<RetrievedChunk>> {
        let results = self
            .store
            .search(&self.collection, embedding, self.top_k)
            .await?;

        tracing::info!(
            collection = %self.collection,
            top_k = self.top_k,
            found = results.len(),
            "Retrieved chunks"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Stage};
    use crate::providers::testing::{hash_vector, BrokenSearchStore, HashEmbedder};
    use crate::providers::MemoryVectorStore;
    use crate::types::{ChunkPayload, VectorPoint};

    async fn seeded_store(texts: &[&str]) -> Arc<MemoryVectorStore> {
        let store = Arc::new(MemoryVectorStore::new());
        for text in texts {
            let payload = ChunkPayload {
                text: text.to_string(),
                source: Some("notes.txt".to_string()),
                page_label: Some("N/A".to_string()),
            };
            store
                .upsert("notes", VectorPoint::new(hash_vector(text), payload))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty_not_error() {
        let retriever = Retriever::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(MemoryVectorStore::new()),
            "notes",
            4,
        );
        assert!(retriever.retrieve("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_returns_best_match_first_within_top_k() {
        let store = seeded_store(&[
            "the mitochondria is the powerhouse of the cell",
            "rivers flow into the sea",
            "volcanoes erupt molten rock",
        ])
        .await;
        let embedder = Arc::new(HashEmbedder::default());
        let retriever = Retriever::new(embedder.clone(), store, "notes", 2);

        let results = retriever.retrieve("what is the powerhouse of the cell").await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].payload.text.contains("mitochondria"));
        assert_eq!(embedder.calls(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_is_distinct_from_empty() {
        let retriever = Retriever::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(BrokenSearchStore),
            "notes",
            4,
        );
        let err = retriever.retrieve("question").await.unwrap_err();
        assert!(matches!(err, Error::StoreQuery(_)));
        assert_eq!(err.stage(), Some(Stage::StoreQuery));
    }

    #[tokio::test]
    async fn test_embedding_failure_stops_before_search() {
        let retriever = Retriever::new(
            Arc::new(HashEmbedder::failing_after(0)),
            Arc::new(BrokenSearchStore),
            "notes",
            4,
        );
        let err = retriever.retrieve("question").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Embedding));
    }
}
