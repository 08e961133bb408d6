//! Document upload endpoint

use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{Document, DocumentType, IngestOptions, IngestResponse};

/// Uploaded file as read from the multipart body
struct Upload {
    filename: String,
    content_type: Option<String>,
    data: bytes::Bytes,
}

/// POST /documents - Chunk and index one file
///
/// Multipart fields: `file` (required), `type` (`pdf` | `text`),
/// `chunk_size`, `chunk_overlap`.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    let start = Instant::now();
    let mut upload = None;
    let mut declared_type = None;
    let mut options = IngestOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => upload = Some(read_upload(field).await?),
            "type" => declared_type = Some(read_text(field).await?),
            "chunk_size" => options.chunk_size = Some(read_number(field).await?),
            "chunk_overlap" => options.chunk_overlap = Some(read_number(field).await?),
            other => tracing::debug!("Ignoring multipart field: {}", other),
        }
    }

    let upload =
        upload.ok_or_else(|| Error::InvalidRequest("missing `file` field".to_string()))?;
    let doc_type = resolve_type(
        declared_type.as_deref(),
        upload.content_type.as_deref(),
        &upload.filename,
    )?;

    tracing::info!("Processing file: {} ({} bytes)", upload.filename, upload.data.len());

    let document = Document::new(upload.filename.clone(), doc_type, upload.data);
    let chunks_indexed = state.pipeline().ingest(document, &options).await?;

    tracing::info!(
        "Ingested file: {} ({} chunks) in {:.1}s",
        upload.filename,
        chunks_indexed,
        start.elapsed().as_secs_f64()
    );

    Ok(Json(IngestResponse { chunks_indexed }))
}

async fn read_upload(field: Field<'_>) -> Result<Upload> {
    let filename = field
        .file_name()
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidRequest("`file` field has no filename".to_string()))?;
    let content_type = field.content_type().map(str::to_string);
    let data = field
        .bytes()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read file: {}", e)))?;

    Ok(Upload {
        filename,
        content_type,
        data,
    })
}

async fn read_text(field: Field<'_>) -> Result<String> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read `{}`: {}", name, e)))
}

async fn read_number(field: Field<'_>) -> Result<usize> {
    let name = field.name().unwrap_or_default().to_string();
    let raw = read_text(field).await?;
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidRequest(format!("`{}` must be a whole number, got {:?}", name, raw)))
}

/// Declared type wins, then a specific content type, then the file extension
fn resolve_type(
    declared: Option<&str>,
    content_type: Option<&str>,
    filename: &str,
) -> Result<DocumentType> {
    if let Some(declared) = declared.filter(|d| !d.trim().is_empty()) {
        return DocumentType::from_declared(declared);
    }
    if let Some(doc_type) = content_type.and_then(|ct| DocumentType::from_declared(ct).ok()) {
        return Ok(doc_type);
    }
    DocumentType::from_filename(filename)
}
