//! Core types for the RAG pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkPayload, Document, DocumentType, Page, RetrievedChunk, VectorPoint};
pub use query::{IngestOptions, QueryRequest};
pub use response::{IngestResponse, QueryResponse};
