//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{RetrievedChunk, VectorPoint};

/// Trait for vector storage and similarity search
///
/// Implementations:
/// - `QdrantStore`: Qdrant over gRPC
/// - `MemoryVectorStore`: process-local cosine index
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert a point into `collection`, creating the collection if needed
    ///
    /// Fails with `Error::StoreWrite`.
    async fn upsert(&self, collection: &str, point: VectorPoint) -> Result<()>;

    /// Return up to `top_k` payloads ranked by descending similarity
    ///
    /// A collection that does not exist yields an empty result.
    /// Fails with `Error::StoreQuery`.
    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>>;

    /// Number of points in `collection` (0 if it does not exist)
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
