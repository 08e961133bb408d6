//! Configuration for the RAG service
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `NOTES_RAG_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::providers::retry::MAX_RETRIES_LIMIT;

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "NOTES_RAG_CONFIG";

/// Main RAG service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding collaborator
    pub embeddings: EmbeddingConfig,
    /// Generative model collaborator
    pub llm: LlmConfig,
    /// Vector store collaborator
    pub vector_db: VectorDbConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
    /// Upload and query requests processed at once (0 = unlimited)
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_size: 100 * 1024 * 1024, // 100MB
            max_concurrent_requests: 1,
        }
    }
}

/// Which remote service speaks for a model collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// OpenAI-compatible HTTP API
    OpenAi,
    /// Local Ollama server
    Ollama,
}

impl std::str::FromStr for ModelProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(Error::Config(format!("Unknown model provider: {}", other))),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend serving the embedding model
    pub provider: ModelProvider,
    /// Embedding model identifier
    pub model: String,
    /// API base URL
    pub base_url: String,
    /// API key (OpenAI only)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after a failed request
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::OpenAi,
            model: "text-embedding-3-large".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend serving the generative model
    pub provider: ModelProvider,
    /// Generation model identifier
    pub model: String,
    /// API base URL
    pub base_url: String,
    /// API key (OpenAI only)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after a failed request
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::OpenAi,
            model: "gpt-4.1".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            temperature: 0.2,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Vector store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Qdrant over gRPC
    Qdrant,
    /// Process-local store, lost on restart
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "qdrant" => Ok(Self::Qdrant),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config(format!("Unknown vector store backend: {}", other))),
        }
    }
}

/// Vector database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Backend holding the vectors
    pub backend: StoreBackend,
    /// Qdrant gRPC endpoint
    pub url: String,
    /// Qdrant API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Collection every chunk is written to and searched in
    pub collection: String,
    /// Retries after a transient gRPC failure
    pub max_retries: u32,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Qdrant,
            url: "http://localhost:6334".to_string(),
            api_key: None,
            collection: "documents".to_string(),
            max_retries: 2,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks of a page
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 300,
        }
    }
}

impl ChunkingConfig {
    /// Reject settings under which chunks would never advance
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than 0".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks fetched per query
    pub top_k: usize,
    /// Optional cap on the assembled context, in characters
    pub max_context_chars: Option<usize>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            max_context_chars: None,
        }
    }
}

impl RagConfig {
    /// Load configuration from an optional TOML file plus the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse TOML config text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Apply `NOTES_RAG_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("NOTES_RAG_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("NOTES_RAG_PORT") {
            self.server.port = parse_number("NOTES_RAG_PORT", &v)?;
        }
        if let Some(v) = lookup("NOTES_RAG_MAX_CONCURRENT_REQUESTS") {
            self.server.max_concurrent_requests =
                parse_number("NOTES_RAG_MAX_CONCURRENT_REQUESTS", &v)?;
        }

        if let Some(v) = lookup("NOTES_RAG_EMBED_PROVIDER") {
            self.embeddings.provider = v.parse()?;
        }
        if let Some(v) = lookup("NOTES_RAG_EMBED_MODEL") {
            self.embeddings.model = v;
        }
        if let Some(v) = lookup("NOTES_RAG_EMBED_URL") {
            self.embeddings.base_url = v;
        }

        if let Some(v) = lookup("NOTES_RAG_LLM_PROVIDER") {
            self.llm.provider = v.parse()?;
        }
        if let Some(v) = lookup("NOTES_RAG_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = lookup("NOTES_RAG_LLM_URL") {
            self.llm.base_url = v;
        }

        // Shared key for both OpenAI collaborators unless set explicitly
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.embeddings.api_key.get_or_insert_with(|| key.clone());
            self.llm.api_key.get_or_insert(key);
        }

        if let Some(v) = lookup("NOTES_RAG_STORE") {
            self.vector_db.backend = v.parse()?;
        }
        if let Some(v) = lookup("NOTES_RAG_QDRANT_URL") {
            self.vector_db.url = v;
        }
        if let Some(v) = lookup("NOTES_RAG_QDRANT_API_KEY") {
            self.vector_db.api_key = Some(v);
        }
        if let Some(v) = lookup("NOTES_RAG_COLLECTION") {
            self.vector_db.collection = v;
        }
        if let Some(v) = lookup("NOTES_RAG_QDRANT_MAX_RETRIES") {
            self.vector_db.max_retries = parse_number("NOTES_RAG_QDRANT_MAX_RETRIES", &v)?;
        }

        if let Some(v) = lookup("NOTES_RAG_CHUNK_SIZE") {
            self.chunking.chunk_size = parse_number("NOTES_RAG_CHUNK_SIZE", &v)?;
        }
        if let Some(v) = lookup("NOTES_RAG_CHUNK_OVERLAP") {
            self.chunking.chunk_overlap = parse_number("NOTES_RAG_CHUNK_OVERLAP", &v)?;
        }
        if let Some(v) = lookup("NOTES_RAG_TOP_K") {
            self.retrieval.top_k = parse_number("NOTES_RAG_TOP_K", &v)?;
        }

        Ok(())
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be greater than 0".to_string()));
        }
        if self.vector_db.collection.trim().is_empty() {
            return Err(Error::Config("vector_db.collection must not be empty".to_string()));
        }
        for (key, retries) in [
            ("embeddings.max_retries", self.embeddings.max_retries),
            ("llm.max_retries", self.llm.max_retries),
            ("vector_db.max_retries", self.vector_db.max_retries),
        ] {
            if retries > MAX_RETRIES_LIMIT {
                return Err(Error::Config(format!(
                    "{} must be at most {} (got {})",
                    key, MAX_RETRIES_LIMIT, retries
                )));
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} is not a valid number: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 300);
        assert_eq!(config.embeddings.model, "text-embedding-3-large");
        assert_eq!(config.llm.model, "gpt-4.1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let chunking = ChunkingConfig {
            chunk_size: 300,
            chunk_overlap: 300,
        };
        assert!(matches!(chunking.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RagConfig::from_toml_str(
            r#"
            [vector_db]
            backend = "memory"
            collection = "clg_notes"

            [chunking]
            chunk_size = 500
            chunk_overlap = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.vector_db.backend, StoreBackend::Memory);
        assert_eq!(config.vector_db.collection, "clg_notes");
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.retrieval.top_k, 4);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("NOTES_RAG_LLM_PROVIDER", "ollama"),
            ("NOTES_RAG_LLM_MODEL", "llama3.2"),
            ("NOTES_RAG_CHUNK_SIZE", "800"),
            ("OPENAI_API_KEY", "sk-test"),
        ]
        .into_iter()
        .collect();

        let mut config = RagConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.llm.provider, ModelProvider::Ollama);
        assert_eq!(config.llm.model, "llama3.2");
        assert_eq!(config.chunking.chunk_size, 800);
        assert_eq!(config.embeddings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_store_retries_override_and_limit() {
        let mut config = RagConfig::default();
        assert_eq!(config.vector_db.max_retries, 2);

        config
            .apply_overrides(|k| (k == "NOTES_RAG_QDRANT_MAX_RETRIES").then(|| "5".to_string()))
            .unwrap();
        assert_eq!(config.vector_db.max_retries, 5);
        assert!(config.validate().is_ok());

        config.llm.max_retries = 40;
        assert!(matches!(config.validate(), Err(Error::Config(m)) if m.contains("llm.max_retries")));
    }

    #[test]
    fn test_bad_env_number_is_config_error() {
        let mut config = RagConfig::default();
        let result = config.apply_overrides(|k| {
            (k == "NOTES_RAG_TOP_K").then(|| "many".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_example_config_parses() {
        let config = RagConfig::from_toml_str(include_str!("../notes-rag.example.toml")).unwrap();
        assert_eq!(config.vector_db.collection, "clg_notes");
        assert_eq!(config.llm.model, "gpt-4.1");
        assert!(config.validate().is_ok());
    }
}
