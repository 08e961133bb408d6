//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;
use crate::error::Result;

/// Trait for generating text embeddings
///
/// Implementations:
/// - `OpenAiEmbedder`: OpenAI embeddings API (text-embedding-3-large)
/// - `OllamaEmbedder`: Local Ollama server (nomic-embed-text)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
