//! Text chunking with page and position tracking
//!
//! Each page is split on its own. A chunk ends at the last paragraph break
//! inside its window, else the last sentence boundary, else the last
//! whitespace, else a hard cut at `chunk_size` characters. The next chunk
//! starts `chunk_overlap` characters before that end, so the overlap is a
//! verbatim slice of the page text.

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::document::NOT_AVAILABLE;
use crate::types::{Chunk, Page};

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    /// Maximum chunk length in characters
    chunk_size: usize,
    /// Characters shared by adjacent chunks
    overlap: usize,
}

/// Character-indexed view of a page
struct PageText<'a> {
    text: &'a str,
    /// Byte offset of every char, plus `text.len()` at the end
    offsets: Vec<usize>,
    chars: Vec<char>,
    /// `sentence_start[i]` is true when a sentence begins at char `i`
    sentence_start: Vec<bool>,
}

impl<'a> PageText<'a> {
    fn new(text: &'a str) -> Self {
        let (mut offsets, chars): (Vec<usize>, Vec<char>) = text.char_indices().unzip();
        offsets.push(text.len());

        let mut sentence_start = vec![false; chars.len() + 1];
        for (byte, _) in text.split_sentence_bound_indices() {
            if let Ok(i) = offsets.binary_search(&byte) {
                sentence_start[i] = true;
            }
        }

        Self {
            text,
            offsets,
            chars,
            sentence_start,
        }
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[self.offsets[start]..self.offsets[end]]
    }

    fn is_paragraph_break(&self, end: usize) -> bool {
        end >= 2 && self.chars[end - 1] == '\n' && self.chars[end - 2] == '\n'
    }

    fn is_whitespace_break(&self, end: usize) -> bool {
        self.chars[end - 1].is_whitespace()
    }
}

impl TextChunker {
    /// Create a new chunker; fails unless `0 < chunk_size` and `overlap < chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        Self::from_config(ChunkingConfig {
            chunk_size,
            chunk_overlap: overlap,
        })
    }

    /// Create a chunker from validated config
    pub fn from_config(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chunk_size: config.chunk_size,
            overlap: config.chunk_overlap,
        })
    }

    /// Chunk ordered pages; chunk indices run across the whole document
    pub fn chunk_pages(&self, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            let page_label = page.page_label.as_deref().unwrap_or(NOT_AVAILABLE);
            for (char_start, text) in self.split(&page.content) {
                chunks.push(Chunk {
                    text: text.to_string(),
                    source: page.source.clone(),
                    page_label: page_label.to_string(),
                    char_start,
                    chunk_index: chunks.len(),
                });
            }
        }

        tracing::debug!(
            pages = pages.len(),
            chunks = chunks.len(),
            chunk_size = self.chunk_size,
            overlap = self.overlap,
            "Chunked document"
        );
        chunks
    }

    /// Split one page into `(char_start, text)` spans
    fn split<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let page = PageText::new(text);
        let mut spans = Vec::new();
        let mut start = 0;

        loop {
            if page.len() - start <= self.chunk_size {
                spans.push((start, page.slice(start, page.len())));
                break;
            }

            let end = self.find_break(&page, start);
            spans.push((start, page.slice(start, end)));
            start = end - self.overlap;
        }

        spans
    }

    /// Pick the end of the chunk starting at `start`
    ///
    /// Candidates lie in `(start + overlap, start + chunk_size]` so the next
    /// chunk always starts past `start`.
    fn find_break(&self, page: &PageText<'_>, start: usize) -> usize {
        let hard_end = start + self.chunk_size;
        let window = (start + self.overlap + 1)..=hard_end;

        window
            .clone()
            .rev()
            .find(|&end| page.is_paragraph_break(end))
            .or_else(|| window.clone().rev().find(|&end| page.sentence_start[end]))
            .or_else(|| window.rev().find(|&end| page.is_whitespace_break(end)))
            .unwrap_or(hard_end)
    }
}
