//! Final stage of the query path: ask the model, grounded in the context

use std::sync::Arc;

use crate::error::Result;
use crate::providers::LlmProvider;

use super::prompt::PromptBuilder;

/// Terminal result of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Model reply, returned as-is
    Answered(String),
    /// Nothing relevant was retrieved; the model was not called
    NoContext,
}

/// Sends the question to the model under a context-bearing system prompt
pub struct Answerer {
    llm: Arc<dyn LlmProvider>,
}

impl Answerer {
    /// Create an answerer over an LLM provider
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Answer `query` from `context`
    ///
    /// A blank context yields [`QueryOutcome::NoContext`] without calling
    /// the model.
    pub async fn answer(&self, query: &str, context: &str) -> Result<QueryOutcome> {
        if context.trim().is_empty() {
            tracing::warn!("No relevant context found");
            return Ok(QueryOutcome::NoContext);
        }

        let system_prompt = PromptBuilder::system_prompt(context);
        tracing::info!(
            provider = self.llm.name(),
            model = self.llm.model(),
            context_chars = context.chars().count(),
            "Generating answer"
        );

        let reply = self.llm.complete(&system_prompt, query).await?;
        Ok(QueryOutcome::Answered(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::providers::testing::CountingLlm;

    #[tokio::test]
    async fn test_empty_context_skips_model() {
        let llm = Arc::new(CountingLlm::replying("unused"));
        let answerer = Answerer::new(llm.clone());

        assert_eq!(answerer.answer("why?", "").await.unwrap(), QueryOutcome::NoContext);
        assert_eq!(answerer.answer("why?", "  \n").await.unwrap(), QueryOutcome::NoContext);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_reply_is_returned_unmodified() {
        let llm = Arc::new(CountingLlm::replying("  See page 4 for details.\n"));
        let answerer = Answerer::new(llm.clone());

        let outcome = answerer
            .answer("What is on page 4?", "Page Content: ATP\nPage Number: 4\nFile Location: bio.pdf")
            .await
            .unwrap();

        assert_eq!(outcome, QueryOutcome::Answered("  See page 4 for details.\n".to_string()));
        assert_eq!(llm.calls(), 1);
        assert!(llm.last_system_prompt().unwrap().contains("Page Number: 4"));
    }

    #[tokio::test]
    async fn test_generation_failure_surfaces() {
        let answerer = Answerer::new(Arc::new(CountingLlm::failing()));
        let err = answerer.answer("q", "some context").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Generation));
    }
}
