//! Application state for the RAG server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::pipeline::RagPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Upload and query paths
    pipeline: RagPipeline,
}

impl AppState {
    /// Create state with the backends named in `config`
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!(
            embeddings = ?config.embeddings.provider,
            llm = ?config.llm.provider,
            store = ?config.vector_db.backend,
            "Initializing RAG application state..."
        );
        let pipeline = RagPipeline::from_config(&config)?;
        Ok(Self::with_pipeline(config, pipeline))
    }

    /// Create state around an already-built pipeline
    pub fn with_pipeline(config: RagConfig, pipeline: RagPipeline) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pipeline }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the pipeline
    pub fn pipeline(&self) -> &RagPipeline {
        &self.inner.pipeline
    }
}
