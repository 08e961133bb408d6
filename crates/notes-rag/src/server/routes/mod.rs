//! API routes for the RAG server

pub mod documents;
pub mod query;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower::limit::GlobalConcurrencyLimitLayer;

use crate::server::state::AppState;

/// Routes that run the pipeline
///
/// All of them share one concurrency limit; `0` leaves them unlimited.
pub fn pipeline_routes(max_upload_size: usize, max_concurrent: usize) -> Router<AppState> {
    let router = Router::new()
        .route(
            "/documents",
            post(documents::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/query", post(query::query));

    if max_concurrent == 0 {
        router
    } else {
        router.layer(GlobalConcurrencyLimitLayer::new(max_concurrent))
    }
}

/// Service routes: liveness, readiness, description
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .route("/info", get(info))
}

/// Liveness
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness: every collaborator answers its health probe
async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let health = state.pipeline().health().await;
    let ready = health.embeddings && health.vector_store && health.llm;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(serde_json::json!({ "ready": ready, "collaborators": health })))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Upload PDFs or text files, then ask questions answered from their content",
        "endpoints": {
            "POST /documents": "Upload a document (multipart: file, type, chunk_size, chunk_overlap)",
            "POST /query": "Ask a question: {\"question\": \"...\"}",
            "GET /health": "Liveness",
            "GET /ready": "Collaborator health",
            "GET /info": "This description"
        },
        "collection": state.pipeline().collection(),
        "chunking": config.chunking,
        "top_k": config.retrieval.top_k,
        "models": {
            "embeddings": config.embeddings.model,
            "llm": config.llm.model
        }
    }))
}
