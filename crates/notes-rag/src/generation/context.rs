//! Renders retrieved chunks into the grounding context

use crate::types::RetrievedChunk;

/// Separator between rendered chunks
pub const BLOCK_SEPARATOR: &str = "\n\n\n";

/// Builds the context block handed to the model
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler {
    /// Optional cap on the rendered length, in characters
    max_chars: Option<usize>,
}

impl ContextAssembler {
    /// Assembler without a length cap
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembler that drops trailing blocks past `max_chars`
    ///
    /// The highest-ranked block is always kept.
    pub fn with_max_chars(max_chars: Option<usize>) -> Self {
        Self { max_chars }
    }

    /// Render one block per chunk, in ranking order
    pub fn assemble(&self, chunks: &[RetrievedChunk]) -> String {
        let mut context = String::new();
        let mut context_chars = 0;

        for (i, chunk) in chunks.iter().enumerate() {
            let block = render_block(chunk);
            let separator_chars = if i == 0 { 0 } else { BLOCK_SEPARATOR.len() };
            let block_chars = block.chars().count() + separator_chars;

            if let Some(max) = self.max_chars {
                if i > 0 && context_chars + block_chars > max {
                    tracing::debug!(kept = i, dropped = chunks.len() - i, max, "Context truncated");
                    break;
                }
            }

            if i > 0 {
                context.push_str(BLOCK_SEPARATOR);
            }
            context.push_str(&block);
            context_chars += block_chars;
        }

        context
    }
}

fn render_block(chunk: &RetrievedChunk) -> String {
    format!(
        "Page Content: {}\nPage Number: {}\nFile Location: {}",
        chunk.payload.text,
        chunk.payload.page_label_or_default(),
        chunk.payload.source_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkPayload;

    fn retrieved(text: &str, page: Option<&str>, source: Option<&str>) -> RetrievedChunk {
        RetrievedChunk {
            payload: ChunkPayload {
                text: text.to_string(),
                source: source.map(str::to_string),
                page_label: page.map(str::to_string),
            },
            score: 0.9,
        }
    }

    #[test]
    fn test_empty_input_is_empty_string() {
        assert_eq!(ContextAssembler::new().assemble(&[]), "");
    }

    #[test]
    fn test_blocks_in_ranking_order() {
        let context = ContextAssembler::new().assemble(&[
            retrieved("Osmosis moves water.", Some("3"), Some("bio.pdf")),
            retrieved("Diffusion moves solutes.", None, None),
        ]);

        assert_eq!(
            context,
            "Page Content: Osmosis moves water.\nPage Number: 3\nFile Location: bio.pdf\n\n\n\
             Page Content: Diffusion moves solutes.\nPage Number: N/A\nFile Location: N/A"
        );
    }

    #[test]
    fn test_max_chars_drops_trailing_blocks() {
        let chunks = vec![
            retrieved(&"a".repeat(100), Some("1"), Some("x.txt")),
            retrieved(&"b".repeat(100), Some("2"), Some("x.txt")),
        ];

        let capped = ContextAssembler::with_max_chars(Some(150)).assemble(&chunks);
        assert!(capped.contains(&"a".repeat(100)));
        assert!(!capped.contains(&"b".repeat(100)));

        let tiny = ContextAssembler::with_max_chars(Some(10)).assemble(&chunks);
        assert!(tiny.contains(&"a".repeat(100)));
    }
}
