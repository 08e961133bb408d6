//! Ollama-based providers for embeddings and LLM
//!
//! Both providers wrap an [`OllamaClient`]; a single client can be shared
//! when embeddings and generation use the same server.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;
use super::retry::{retry_request, RetryError};

/// Ollama API client with automatic retry
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Server base URL
    base_url: String,
    /// Maximum retries
    max_retries: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new Ollama client with retry support
    pub fn new(base_url: &str, timeout_secs: u64, max_retries: u32) -> Result<Self> {
        Ok(Self {
            client: super::http_client(timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
        })
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate an embedding with retry
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        retry_request("Ollama embedding", self.max_retries, || async {
            let request = EmbedRequest { model, prompt: text };

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    RetryError::from_transport(
                        &e,
                        Error::embedding(format!("Embedding request failed: {}", e)),
                    )
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(RetryError::from_status(
                    status,
                    Error::embedding(format!("Embedding failed: HTTP {}", status)),
                ));
            }

            let embed_response: EmbedResponse = response.json().await.map_err(|e| {
                Error::embedding(format!("Failed to parse embedding response: {}", e))
            })?;

            Ok(embed_response.embedding)
        })
        .await
    }

    /// Generate a completion under a system prompt with retry
    pub async fn generate(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        tracing::info!("Generating answer with model: {}", model);

        retry_request("Ollama generation", self.max_retries, || async {
            let request = GenerateRequest {
                model,
                system,
                prompt,
                stream: false,
                options: GenerateOptions { temperature },
            };

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    RetryError::from_transport(
                        &e,
                        Error::generation(format!("Generation request failed: {}", e)),
                    )
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RetryError::from_status(
                    status,
                    Error::generation(format!("Generation failed: HTTP {} - {}", status, body)),
                ));
            }

            let generate_response: GenerateResponse = response.json().await.map_err(|e| {
                Error::generation(format!("Failed to parse generation response: {}", e))
            })?;

            Ok(generate_response.response)
        })
        .await
    }
}

/// Ollama embedding provider using nomic-embed-text or similar models
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = OllamaClient::new(&config.base_url, config.timeout_secs, config.max_retries)?;
        Ok(Self::from_client(Arc::new(client), config.model.clone()))
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(&self.model, text).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama LLM provider for answer generation
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
    model: String,
    temperature: f32,
}

impl OllamaLlm {
    /// Create a new Ollama LLM provider
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = OllamaClient::new(&config.base_url, config.timeout_secs, config.max_retries)?;
        Ok(Self::from_client(
            Arc::new(client),
            config.model.clone(),
            config.temperature,
        ))
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>, model: String, temperature: f32) -> Self {
        Self {
            client,
            model,
            temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        self.client
            .generate(&self.model, system_prompt, user_message, self.temperature)
            .await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
