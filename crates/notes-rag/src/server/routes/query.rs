//! Question answering endpoint

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

/// POST /query - Answer a question from the indexed documents
///
/// Responds `{"answer": ...}`, or `{"no_context": true}` when nothing
/// relevant is stored.
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    if request.question.trim().is_empty() {
        return Err(Error::InvalidRequest("question must not be empty".to_string()));
    }

    let start = Instant::now();
    let outcome = state.pipeline().query(&request.question).await?;
    tracing::info!("Query answered in {}ms", start.elapsed().as_millis());

    Ok(Json(QueryResponse::from(outcome)))
}
