//! In-memory vector store using cosine similarity
//!
//! Suitable for local runs and tests; contents are lost on restart.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::types::{RetrievedChunk, VectorPoint};

use super::vector_store::VectorStoreProvider;

/// Process-local vector store
///
/// Collections are created on first upsert and fix their dimensionality
/// from the first vector written.
#[derive(Debug, Default)]
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<VectorPoint>>>,
}

impl MemoryVectorStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine similarity; 0.0 if either vector has zero magnitude
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStoreProvider for MemoryVectorStore {
    async fn upsert(&self, collection: &str, point: VectorPoint) -> Result<()> {
        if point.vector.is_empty() {
            return Err(Error::store_write("point has an empty vector"));
        }

        let mut collections = self.collections.write();
        let points = collections.entry(collection.to_string()).or_default();

        if let Some(existing) = points.first() {
            if existing.vector.len() != point.vector.len() {
                return Err(Error::store_write(format!(
                    "collection '{}' holds {}-dimensional vectors, got {}",
                    collection,
                    existing.vector.len(),
                    point.vector.len()
                )));
            }
        }

        points.push(point);
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let collections = self.collections.read();
        let Some(points) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        if let Some(existing) = points.first() {
            if existing.vector.len() != query_embedding.len() {
                return Err(Error::store_query(format!(
                    "query has {} dimensions, collection '{}' has {}",
                    query_embedding.len(),
                    collection,
                    existing.vector.len()
                )));
            }
        }

        let mut scored: Vec<RetrievedChunk> = points
            .iter()
            .map(|point| RetrievedChunk {
                payload: point.payload.clone(),
                score: cosine_similarity(&point.vector, query_embedding),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .map_or(0, |points| points.len()))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
