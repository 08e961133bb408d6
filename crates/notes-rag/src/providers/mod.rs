//! Provider abstractions for embeddings, LLM and vector storage
//!
//! This module provides trait-based abstractions that allow switching between
//! hosted (OpenAI, Qdrant) and local (Ollama, in-memory) backends.

pub mod embedding;
pub mod llm;
pub mod memory;
pub mod ollama;
pub mod openai;
pub mod qdrant;
pub mod retry;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod testing;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use memory::MemoryVectorStore;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
pub use openai::{OpenAiChat, OpenAiEmbedder};
pub use qdrant::QdrantStore;
pub use vector_store::VectorStoreProvider;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig, ModelProvider, StoreBackend, VectorDbConfig};
use crate::error::{Error, Result};

/// HTTP client shared by the REST-backed providers
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))
}

/// Build the configured embedding provider
pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedder: Arc<dyn EmbeddingProvider> = match config.provider {
        ModelProvider::OpenAi => Arc::new(OpenAiEmbedder::new(config)?),
        ModelProvider::Ollama => Arc::new(OllamaEmbedder::new(config)?),
    };
    tracing::info!(provider = embedder.name(), model = %config.model, "Embedding provider ready");
    Ok(embedder)
}

/// Build the configured LLM provider
pub fn build_llm(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    let llm: Arc<dyn LlmProvider> = match config.provider {
        ModelProvider::OpenAi => Arc::new(OpenAiChat::new(config)?),
        ModelProvider::Ollama => Arc::new(OllamaLlm::new(config)?),
    };
    tracing::info!(provider = llm.name(), model = llm.model(), "LLM provider ready");
    Ok(llm)
}

/// Build both model collaborators
///
/// When embeddings and generation both use the same Ollama server they share
/// one [`OllamaClient`], taking the longer timeout and the higher retry count.
pub fn build_models(
    embeddings: &EmbeddingConfig,
    llm: &LlmConfig,
) -> Result<(Arc<dyn EmbeddingProvider>, Arc<dyn LlmProvider>)> {
    let Some(client) = shared_ollama_client(embeddings, llm)? else {
        return Ok((build_embedder(embeddings)?, build_llm(llm)?));
    };

    tracing::info!(
        base_url = %llm.base_url,
        embed_model = %embeddings.model,
        llm_model = %llm.model,
        "Embeddings and LLM share one Ollama client"
    );
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::from_client(
        Arc::clone(&client),
        embeddings.model.clone(),
    ));
    let generator: Arc<dyn LlmProvider> = Arc::new(OllamaLlm::from_client(
        client,
        llm.model.clone(),
        llm.temperature,
    ));
    Ok((embedder, generator))
}

fn shared_ollama_client(
    embeddings: &EmbeddingConfig,
    llm: &LlmConfig,
) -> Result<Option<Arc<OllamaClient>>> {
    let same_server = embeddings.provider == ModelProvider::Ollama
        && llm.provider == ModelProvider::Ollama
        && embeddings.base_url.trim_end_matches('/') == llm.base_url.trim_end_matches('/');
    if !same_server {
        return Ok(None);
    }

    let client = OllamaClient::new(
        &llm.base_url,
        embeddings.timeout_secs.max(llm.timeout_secs),
        embeddings.max_retries.max(llm.max_retries),
    )?;
    Ok(Some(Arc::new(client)))
}

/// Build the configured vector store
pub fn build_vector_store(config: &VectorDbConfig) -> Result<Arc<dyn VectorStoreProvider>> {
    let store: Arc<dyn VectorStoreProvider> = match config.backend {
        StoreBackend::Qdrant => Arc::new(QdrantStore::new(config)?),
        StoreBackend::Memory => Arc::new(MemoryVectorStore::new()),
    };
    tracing::info!(backend = store.name(), collection = %config.collection, "Vector store ready");
    Ok(store)
}
