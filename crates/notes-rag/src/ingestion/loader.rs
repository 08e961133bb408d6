//! Document loading: scoped temp file plus PDF / plain-text extraction

use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Document, DocumentType, Page};

/// Turns an uploaded [`Document`] into ordered [`Page`]s
pub struct DocumentLoader;

impl DocumentLoader {
    /// Extract pages on the blocking pool
    pub async fn load(document: Document) -> Result<Vec<Page>> {
        tokio::task::spawn_blocking(move || Self::load_blocking(&document))
            .await
            .map_err(|e| Error::internal(format!("extraction task failed: {}", e)))?
    }

    /// Extract pages synchronously
    ///
    /// The bytes are written to a temp file that is removed when this
    /// function returns, whether extraction succeeded or not.
    pub fn load_blocking(document: &Document) -> Result<Vec<Page>> {
        Self::load_blocking_in(document, &std::env::temp_dir())
    }

    /// Extract pages, staging the upload under `dir`
    pub fn load_blocking_in(document: &Document, dir: &Path) -> Result<Vec<Page>> {
        let mut file = tempfile::Builder::new()
            .prefix("notes-rag-")
            .suffix(document.doc_type.suffix())
            .tempfile_in(dir)?;
        file.write_all(&document.data)?;
        file.flush()?;

        tracing::debug!(
            source = %document.source,
            doc_type = document.doc_type.display_name(),
            path = %file.path().display(),
            "Staged upload"
        );

        let pages = match document.doc_type {
            DocumentType::Pdf => extract_pdf(file.path(), &document.source),
            DocumentType::PlainText => extract_text(file.path(), &document.source),
        }?;

        tracing::info!(source = %document.source, pages = pages.len(), "Extracted pages");
        Ok(pages)
    }
}

fn extract_text(path: &Path, source: &str) -> Result<Vec<Page>> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8(bytes)
        .map_err(|e| Error::file_parse(source, format!("file is not valid UTF-8: {}", e)))?;
    Ok(vec![Page::new(source, None, content)])
}

fn extract_pdf(path: &Path, source: &str) -> Result<Vec<Page>> {
    let pdf = lopdf::Document::load(path)
        .map_err(|e| Error::file_parse(source, format!("failed to load PDF: {}", e)))?;

    let mut pages = Vec::new();
    for page_number in pdf.get_pages().keys() {
        let content = match pdf.extract_text(&[*page_number]) {
            Ok(text) => clean_text(&text),
            Err(e) => {
                tracing::debug!("Could not extract text from page {}: {}", page_number, e);
                String::new()
            }
        };
        pages.push(Page::new(source, Some(page_number.to_string()), content));
    }

    if pages.iter().any(|p| !p.content.trim().is_empty()) {
        return Ok(pages);
    }

    // Fonts lopdf cannot decode often still work with pdf-extract, at the cost of page labels
    match pdf_extract::extract_text(path) {
        Ok(text) if !text.trim().is_empty() => {
            tracing::warn!(source, "Page-level extraction found no text, using whole-document text");
            Ok(vec![Page::new(source, None, clean_text(&text))])
        }
        Ok(_) => {
            tracing::warn!(source, "PDF has no extractable text; it may be image-based");
            Ok(pages)
        }
        Err(e) => {
            tracing::warn!(source, "pdf-extract failed: {}", e);
            Ok(pages)
        }
    }
}

fn clean_text(text: &str) -> String {
    text.replace('\0', "")
}
