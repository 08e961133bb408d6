//! Query path, after retrieval: context assembly and answer generation

pub mod answerer;
pub mod context;
pub mod prompt;

pub use answerer::{Answerer, QueryOutcome};
pub use context::ContextAssembler;
pub use prompt::PromptBuilder;
