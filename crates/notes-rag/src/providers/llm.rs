//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;

/// Trait for chat-style text generation
///
/// Implementations:
/// - `OpenAiChat`: OpenAI chat completions (gpt-4.1)
/// - `OllamaLlm`: Local Ollama server
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a reply to `user_message` under `system_prompt`
    ///
    /// Fails with `Error::Generation`.
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
