//! Request types

use serde::{Deserialize, Serialize};

use crate::config::ChunkingConfig;

/// Query request for the RAG pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,
}

/// Per-upload ingestion options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Custom chunk size (overrides config)
    pub chunk_size: Option<usize>,

    /// Custom chunk overlap (overrides config)
    pub chunk_overlap: Option<usize>,
}

impl IngestOptions {
    /// Resolve against the configured defaults
    pub fn resolve(&self, defaults: ChunkingConfig) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
            chunk_overlap: self.chunk_overlap.unwrap_or(defaults.chunk_overlap),
        }
    }
}
