//! Document, page and chunk types with provenance tracking

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Placeholder rendered when a chunk has no page or source
pub const NOT_AVAILABLE: &str = "N/A";

/// Supported document formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// PDF document, extracted page by page
    Pdf,
    /// UTF-8 text, treated as a single unlabelled page
    PlainText,
}

impl DocumentType {
    /// Resolve a declared type (`pdf`, `text`, or a MIME type)
    pub fn from_declared(declared: &str) -> Result<Self> {
        match declared.trim().to_lowercase().as_str() {
            "pdf" | "application/pdf" => Ok(Self::Pdf),
            "text" | "txt" | "plain-text" | "text/plain" => Ok(Self::PlainText),
            other => Err(Error::UnsupportedFileType(other.to_string())),
        }
    }

    /// Guess the type from a filename extension
    pub fn from_filename(filename: &str) -> Result<Self> {
        let mime = mime_guess::from_path(filename).first_raw();
        match mime {
            Some(mime) => Self::from_declared(mime),
            None => Err(Error::UnsupportedFileType(filename.to_string())),
        }
    }

    /// File suffix used for the scoped temp file
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::PlainText => ".txt",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::PlainText => "Text File",
        }
    }
}

/// An uploaded document, alive for one ingestion request
#[derive(Debug, Clone)]
pub struct Document {
    /// Filename or path; becomes every chunk's `source`
    pub source: String,
    /// Declared format
    pub doc_type: DocumentType,
    /// Raw file content
    pub data: Bytes,
}

impl Document {
    /// Create a new document
    pub fn new(source: impl Into<String>, doc_type: DocumentType, data: impl Into<Bytes>) -> Self {
        Self {
            source: source.into(),
            doc_type,
            data: data.into(),
        }
    }
}

/// Ordered unit of extracted text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Originating document
    pub source: String,
    /// 1-based page label; `None` when the format has no pages
    pub page_label: Option<String>,
    /// Page text
    pub content: String,
}

impl Page {
    /// Create a page
    pub fn new(source: impl Into<String>, page_label: Option<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            page_label,
            content: content.into(),
        }
    }
}

/// Atomic unit of indexing and retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Verbatim substring of the page text
    pub text: String,
    /// Originating document
    pub source: String,
    /// Page the chunk came from, `N/A` if unknown
    pub page_label: String,
    /// Character offset of `text` within its page
    pub char_start: usize,
    /// Position of the chunk in the chunker output
    pub chunk_index: usize,
}

impl Chunk {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Payload stored next to the vector
    pub fn payload(&self) -> ChunkPayload {
        ChunkPayload {
            text: self.text.clone(),
            source: Some(self.source.clone()),
            page_label: Some(self.page_label.clone()),
        }
    }
}

/// Chunk fields persisted in the vector store
///
/// `source` and `page_label` are optional so collections written by other
/// tools can still be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPayload {
    /// Chunk text
    pub text: String,
    /// Originating document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Page label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_label: Option<String>,
}

impl ChunkPayload {
    /// Source, or `N/A`
    pub fn source_or_default(&self) -> &str {
        self.source.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    /// Page label, or `N/A`
    pub fn page_label_or_default(&self) -> &str {
        self.page_label.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

/// A vector handed to the store; the store owns it afterwards
#[derive(Debug, Clone)]
pub struct VectorPoint {
    /// Fresh ID per upsert, so re-ingesting a file duplicates its chunks
    pub id: Uuid,
    /// Embedding of `payload.text`
    pub vector: Vec<f32>,
    /// Stored chunk fields
    pub payload: ChunkPayload,
}

impl VectorPoint {
    /// Create a point with a new random ID
    pub fn new(vector: Vec<f32>, payload: ChunkPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            vector,
            payload,
        }
    }
}

/// A chunk returned by similarity search, in store ranking order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Stored chunk fields
    pub payload: ChunkPayload,
    /// Similarity reported by the store (higher is closer)
    pub score: f32,
}
