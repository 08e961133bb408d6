//! Upload path: load pages, chunk them, index the chunks

mod chunker;
mod indexer;
mod loader;

pub use chunker::TextChunker;
pub use indexer::Indexer;
pub use loader::DocumentLoader;

#[cfg(test)]
pub(crate) use loader::tests::build_pdf;
