//! Query path, first stage: similarity search for a question

mod retriever;

pub use retriever::Retriever;
