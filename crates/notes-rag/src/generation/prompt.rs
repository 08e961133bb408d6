//! System prompt for context-grounded answers

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the system prompt with the context embedded
    ///
    /// The user's question is sent separately, unmodified, as the user turn.
    pub fn system_prompt(context: &str) -> String {
        format!(
            "You are a helpful AI Assistant who answers user query based on the available \
             context retrieved from a PDF file along with page_contents and page number.\n\n\
             You should only answer the user based on the following context and navigate the \
             user to open the right page number to know more.\n\n\
             Context:\n{context}"
        )
    }
}
