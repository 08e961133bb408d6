//! Upload and query paths wired over the three collaborators
//!
//! Upload: load pages, chunk, index. Query: embed, search, assemble the
//! context, then answer or report that nothing relevant was found.

use serde::Serialize;
use std::sync::Arc;

use crate::config::{ChunkingConfig, RagConfig};
use crate::error::{Error, Result};
use crate::generation::{Answerer, ContextAssembler};
use crate::ingestion::{DocumentLoader, Indexer, TextChunker};
use crate::providers::{self, EmbeddingProvider, LlmProvider, VectorStoreProvider};
use crate::retrieval::Retriever;
use crate::types::{Document, IngestOptions};

pub use crate::generation::QueryOutcome;

/// Where a query is in its lifecycle
///
/// `Idle -> Embedding -> Searching -> NoResults`, or
/// `Searching -> ContextFound -> Generating -> Answered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Idle,
    Embedding,
    Searching,
    NoResults,
    ContextFound,
    Generating,
    Answered,
}

impl QueryState {
    /// Whether the query has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoResults | Self::Answered)
    }

    fn advance(&mut self, next: QueryState) {
        tracing::debug!(from = ?*self, to = ?next, "Query state");
        *self = next;
    }
}

/// Result of probing each collaborator
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CollaboratorHealth {
    pub embeddings: bool,
    pub vector_store: bool,
    pub llm: bool,
}

/// The full RAG pipeline
pub struct RagPipeline {
    chunking: ChunkingConfig,
    indexer: Indexer,
    retriever: Retriever,
    assembler: ContextAssembler,
    answerer: Answerer,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    llm: Arc<dyn LlmProvider>,
}

impl RagPipeline {
    /// Build the pipeline with the backends named in `config`
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let (embedder, llm) = providers::build_models(&config.embeddings, &config.llm)?;
        let store = providers::build_vector_store(&config.vector_db)?;
        Ok(Self::new(config, embedder, store, llm))
    }

    /// Build the pipeline over explicit collaborators
    pub fn new(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let collection = config.vector_db.collection.clone();
        Self {
            chunking: config.chunking,
            indexer: Indexer::new(Arc::clone(&embedder), Arc::clone(&store), collection.clone()),
            retriever: Retriever::new(
                Arc::clone(&embedder),
                Arc::clone(&store),
                collection,
                config.retrieval.top_k,
            ),
            assembler: ContextAssembler::with_max_chars(config.retrieval.max_context_chars),
            answerer: Answerer::new(Arc::clone(&llm)),
            embedder,
            store,
            llm,
        }
    }

    /// Upload path: returns the number of chunks indexed
    pub async fn ingest(&self, document: Document, options: &IngestOptions) -> Result<usize> {
        let chunking = options.resolve(self.chunking);
        let chunker = TextChunker::from_config(chunking).map_err(|e| match e {
            Error::Config(message) => Error::InvalidRequest(message),
            other => other,
        })?;

        let source = document.source.clone();
        tracing::info!(
            source = %source,
            doc_type = document.doc_type.display_name(),
            bytes = document.data.len(),
            "Ingesting document"
        );

        let pages = DocumentLoader::load(document).await?;
        let chunks = chunker.chunk_pages(&pages);
        tracing::info!(source = %source, pages = pages.len(), chunks = chunks.len(), "Chunked document");

        self.indexer.index(&chunks).await
    }

    /// Query path
    pub async fn query(&self, question: &str) -> Result<QueryOutcome> {
        let mut state = QueryState::Idle;
        tracing::info!("Query: \"{}\"", question);

        state.advance(QueryState::Embedding);
        let embedding = self.retriever.embed_query(question).await?;

        state.advance(QueryState::Searching);
        let retrieved = self.retriever.search(&embedding).await?;

        if retrieved.is_empty() {
            state.advance(QueryState::NoResults);
            tracing::warn!("No relevant context found");
            return Ok(QueryOutcome::NoContext);
        }

        state.advance(QueryState::ContextFound);
        let context = self.assembler.assemble(&retrieved);

        state.advance(QueryState::Generating);
        let outcome = self.answerer.answer(question, &context).await?;

        state.advance(match outcome {
            QueryOutcome::Answered(_) => QueryState::Answered,
            QueryOutcome::NoContext => QueryState::NoResults,
        });
        debug_assert!(state.is_terminal());
        Ok(outcome)
    }

    /// Probe every collaborator
    pub async fn health(&self) -> CollaboratorHealth {
        let (embeddings, vector_store, llm) = tokio::join!(
            self.embedder.health_check(),
            self.store.health_check(),
            self.llm.health_check(),
        );
        CollaboratorHealth {
            embeddings: embeddings.unwrap_or(false),
            vector_store: vector_store.unwrap_or(false),
            llm: llm.unwrap_or(false),
        }
    }

    /// Collection chunks are written to and searched in
    pub fn collection(&self) -> &str {
        self.indexer.collection()
    }

    /// Number of chunks currently stored
    pub async fn indexed_chunks(&self) -> Result<usize> {
        self.store.count(self.collection()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::providers::testing::{BrokenSearchStore, CountingLlm, HashEmbedder};
    use crate::providers::MemoryVectorStore;
    use crate::types::DocumentType;

    fn pipeline_with(
        store: Arc<dyn VectorStoreProvider>,
        llm: Arc<CountingLlm>,
    ) -> RagPipeline {
        RagPipeline::new(&RagConfig::default(), Arc::new(HashEmbedder::default()), store, llm)
    }

    #[test]
    fn test_terminal_states() {
        assert!(QueryState::NoResults.is_terminal());
        assert!(QueryState::Answered.is_terminal());
        assert!(!QueryState::ContextFound.is_terminal());
    }

    #[tokio::test]
    async fn test_query_without_documents_is_no_context() {
        let llm = Arc::new(CountingLlm::replying("unused"));
        let pipeline = pipeline_with(Arc::new(MemoryVectorStore::new()), llm.clone());

        assert_eq!(pipeline.query("anything?").await.unwrap(), QueryOutcome::NoContext);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_ingest_then_answer() {
        let llm = Arc::new(CountingLlm::replying("Open page N/A."));
        let pipeline = pipeline_with(Arc::new(MemoryVectorStore::new()), llm.clone());

        let document = Document::new(
            "cells.txt",
            DocumentType::PlainText,
            "Ribosomes build proteins from amino acids.",
        );
        let indexed = pipeline.ingest(document, &IngestOptions::default()).await.unwrap();
        assert_eq!(indexed, 1);
        assert_eq!(pipeline.indexed_chunks().await.unwrap(), 1);

        let outcome = pipeline.query("What do ribosomes build?").await.unwrap();
        assert_eq!(outcome, QueryOutcome::Answered("Open page N/A.".to_string()));
        assert_eq!(llm.calls(), 1);
        let prompt = llm.last_system_prompt().unwrap();
        assert!(prompt.contains("Ribosomes build proteins"));
        assert!(prompt.contains("File Location: cells.txt"));
    }

    #[tokio::test]
    async fn test_pdf_answers_cite_page_numbers() {
        let llm = Arc::new(CountingLlm::replying("Open page 2."));
        let pipeline = pipeline_with(Arc::new(MemoryVectorStore::new()), llm.clone());

        let bytes = crate::ingestion::build_pdf(&["Glycolysis splits glucose", "Krebs cycle"]);
        let document = Document::new("lecture.pdf", DocumentType::Pdf, bytes);
        assert_eq!(pipeline.ingest(document, &IngestOptions::default()).await.unwrap(), 2);

        pipeline.query("Where is the Krebs cycle?").await.unwrap();
        let prompt = llm.last_system_prompt().unwrap();
        assert!(prompt.contains("Page Number: 1"));
        assert!(prompt.contains("Page Number: 2"));
        assert!(prompt.contains("File Location: lecture.pdf"));
    }

    #[tokio::test]
    async fn test_invalid_overrides_are_caller_errors() {
        let pipeline = pipeline_with(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(CountingLlm::replying("unused")),
        );
        let options = IngestOptions {
            chunk_size: Some(100),
            chunk_overlap: Some(100),
        };
        let document = Document::new("a.txt", DocumentType::PlainText, "text");
        let err = pipeline.ingest(document, &options).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_store_failure_aborts_query() {
        let llm = Arc::new(CountingLlm::replying("unused"));
        let pipeline = pipeline_with(Arc::new(BrokenSearchStore), llm.clone());

        let err = pipeline.query("anything?").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::StoreQuery));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_health_reports_each_collaborator() {
        let pipeline = pipeline_with(
            Arc::new(BrokenSearchStore),
            Arc::new(CountingLlm::replying("ok")),
        );
        let health = pipeline.health().await;
        assert!(health.embeddings);
        assert!(!health.vector_store);
        assert!(health.llm);
    }
}
