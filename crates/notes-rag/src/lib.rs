//! notes-rag: Document Q&A over uploaded PDFs and text files
//!
//! Uploaded documents are split into overlapping chunks, embedded and
//! stored in a vector index. Questions are embedded, matched against the
//! stored chunks, and answered by a language model that sees only the
//! retrieved chunks and their page numbers.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::{QueryOutcome, RagPipeline};
pub use types::{
    document::{Chunk, Document, DocumentType, Page, RetrievedChunk},
    query::{IngestOptions, QueryRequest},
    response::{IngestResponse, QueryResponse},
};
