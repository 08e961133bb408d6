//! Error types for the RAG pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage a failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reading, typing or extracting the uploaded document
    Ingestion,
    /// Embedding collaborator
    Embedding,
    /// Vector store upsert
    StoreWrite,
    /// Vector store similarity search
    StoreQuery,
    /// Generative model
    Generation,
}

impl Stage {
    /// Stable name used in logs and error bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ingestion => "ingestion",
            Stage::Embedding => "embedding",
            Stage::StoreWrite => "store_write",
            Stage::StoreQuery => "store_query",
            Stage::Generation => "generation",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RAG pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed request from the caller
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// File could not be read or its text extracted
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Declared document type is neither PDF nor plain text
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Embedding collaborator failed
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector store rejected an upsert
    #[error("Vector store write failed: {0}")]
    StoreWrite(String),

    /// Vector store search failed
    #[error("Vector store query failed: {0}")]
    StoreQuery(String),

    /// Generative model failed
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Indexing stopped part-way; earlier chunks stay persisted
    #[error("Indexing stopped at chunk {failed_at} after {indexed} chunks were indexed: {source}")]
    Indexing {
        indexed: usize,
        failed_at: usize,
        #[source]
        source: Box<Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a store write error
    pub fn store_write(message: impl Into<String>) -> Self {
        Self::StoreWrite(message.into())
    }

    /// Create a store query error
    pub fn store_query(message: impl Into<String>) -> Self {
        Self::StoreQuery(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The pipeline stage this error originated from, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::FileParse { .. } | Error::UnsupportedFileType(_) => Some(Stage::Ingestion),
            Error::Embedding(_) => Some(Stage::Embedding),
            Error::StoreWrite(_) => Some(Stage::StoreWrite),
            Error::StoreQuery(_) => Some(Stage::StoreQuery),
            Error::Generation(_) => Some(Stage::Generation),
            Error::Indexing { source, .. } => source.stage(),
            _ => None,
        }
    }

    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Error::FileParse { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "parse_error"),
            Error::UnsupportedFileType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_type")
            }
            Error::Embedding(_) => (StatusCode::BAD_GATEWAY, "embedding_error"),
            Error::StoreWrite(_) => (StatusCode::BAD_GATEWAY, "store_write_error"),
            Error::StoreQuery(_) => (StatusCode::BAD_GATEWAY, "store_query_error"),
            Error::Generation(_) => (StatusCode::SERVICE_UNAVAILABLE, "generation_error"),
            Error::Indexing { source, .. } => (source.status_and_type().0, "partial_index"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();
        let stage = self.stage();
        let message = self.to_string();

        let mut body = json!({
            "error": {
                "type": error_type,
                "stage": stage,
                "message": message,
            }
        });

        if let Error::Indexing { indexed, failed_at, .. } = &self {
            body["chunks_indexed"] = json!(indexed);
            body["failed_chunk"] = json!(failed_at);
        }

        (status, Json(body)).into_response()
    }
}
