//! Embeds chunks and writes them to the vector store

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::{Chunk, VectorPoint};

/// Writes chunks into one collection, one embedding call per chunk
///
/// Not transactional: when a chunk fails, chunks before it stay in the
/// store and the error reports how far indexing got. Every call writes new
/// points, so indexing the same document twice stores it twice.
pub struct Indexer {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    collection: String,
}

impl Indexer {
    /// Create an indexer for `collection`
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: collection.into(),
        }
    }

    /// Index chunks in order and return how many were written
    ///
    /// Stops at the first failure with [`Error::Indexing`], whose source is
    /// the `Embedding` or `StoreWrite` error that caused it.
    pub async fn index(&self, chunks: &[Chunk]) -> Result<usize> {
        for (position, chunk) in chunks.iter().enumerate() {
            if let Err(e) = self.index_one(chunk).await {
                tracing::error!(
                    collection = %self.collection,
                    indexed = position,
                    failed_at = position,
                    "Indexing stopped: {}",
                    e
                );
                return Err(Error::Indexing {
                    indexed: position,
                    failed_at: position,
                    source: Box::new(e),
                });
            }
        }

        tracing::info!(
            collection = %self.collection,
            chunks = chunks.len(),
            "Indexed document chunks"
        );
        Ok(chunks.len())
    }

    async fn index_one(&self, chunk: &Chunk) -> Result<()> {
        let vector = self.embedder.embed(&chunk.text).await?;
        let point = VectorPoint::new(vector, chunk.payload());
        tracing::debug!(
            chunk_index = chunk.chunk_index,
            page = %chunk.page_label,
            point_id = %point.id,
            "Upserting chunk"
        );
        self.store.upsert(&self.collection, point).await
    }

    /// Collection this indexer writes to
    pub fn collection(&self) -> &str {
        &self.collection
    }
}
