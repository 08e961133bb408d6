//! OpenAI-compatible providers for embeddings and chat completions

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;
use super::retry::{retry_request, Attempt, RetryError};

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pull the API's error message out of a failed response body
async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    format!("HTTP {} - {}", status, detail)
}

fn require_key(api_key: Option<&str>, what: &str) -> Result<String> {
    match api_key {
        Some(key) if !key.trim().is_empty() => Ok(key.to_string()),
        _ => Err(Error::Config(format!(
            "{} requires an API key (set OPENAI_API_KEY)",
            what
        ))),
    }
}

/// Whether the API answers an authenticated `GET /models`; not retried
async fn models_reachable(client: &Client, models_url: &str, api_key: &str) -> bool {
    match client.get(models_url).bearer_auth(api_key).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}

/// Embedding provider backed by the `/embeddings` endpoint
pub struct OpenAiEmbedder {
    client: Client,
    url: String,
    models_url: String,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl OpenAiEmbedder {
    /// Create from config; fails without an API key
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/');
        Ok(Self {
            client: super::http_client(config.timeout_secs)?,
            url: format!("{}/embeddings", base_url),
            models_url: format!("{}/models", base_url),
            api_key: require_key(config.api_key.as_deref(), "OpenAI embeddings")?,
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn request_embedding(&self, text: &str) -> Attempt<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: vec![text],
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                RetryError::from_transport(&e, Error::embedding(format!("request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetryError::from_status(
                status,
                Error::embedding(error_detail(response).await),
            ));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("failed to parse response: {}", e)))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::embedding("API returned empty response"))?;
        Ok(embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        tracing::debug!(model = %self.model, text_len = text.len(), "embedding text");
        retry_request("OpenAI embedding", self.max_retries, || {
            self.request_embedding(text)
        })
        .await
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(models_reachable(&self.client, &self.models_url, &self.api_key).await)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// LLM provider backed by the `/chat/completions` endpoint
pub struct OpenAiChat {
    client: Client,
    url: String,
    models_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl OpenAiChat {
    /// Create from config; fails without an API key
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/');
        Ok(Self {
            client: super::http_client(config.timeout_secs)?,
            url: format!("{}/chat/completions", base_url),
            models_url: format!("{}/models", base_url),
            api_key: require_key(config.api_key.as_deref(), "OpenAI chat")?,
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }

    async fn request_completion(&self, system_prompt: &str, user_message: &str) -> Attempt<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                RetryError::from_transport(&e, Error::generation(format!("request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetryError::from_status(
                status,
                Error::generation(error_detail(response).await),
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::generation("response contained no message content"))?;
        Ok(content)
    }
}

#[async_trait]
impl LlmProvider for OpenAiChat {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        tracing::info!("Generating answer with model: {}", self.model);
        retry_request("OpenAI chat completion", self.max_retries, || {
            self.request_completion(system_prompt, user_message)
        })
        .await
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(models_reachable(&self.client, &self.models_url, &self.api_key).await)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
