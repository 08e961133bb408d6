//! HTTP server for the RAG system

pub mod routes;
pub mod state;

use axum::Router;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::pipeline::RagPipeline;
use state::AppState;

/// RAG HTTP Server
pub struct RagServer {
    config: RagConfig,
    state: AppState,
}

impl RagServer {
    /// Create a server with the backends named in `config`
    pub fn new(config: RagConfig) -> Result<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Create a server around an already-built pipeline
    pub fn with_pipeline(config: RagConfig, pipeline: RagPipeline) -> Self {
        let state = AppState::with_pipeline(config.clone(), pipeline);
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .merge(routes::service_routes())
            .merge(routes::pipeline_routes(
                self.config.server.max_upload_size,
                self.config.server.max_concurrent_requests,
            ))
            .with_state(self.state.clone())
            // Applied bottom to top
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(cors)
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.router();

        tracing::info!("Starting RAG server on http://{}", addr);
        tracing::info!("API description: http://{}/info", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
