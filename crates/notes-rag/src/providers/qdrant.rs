//! Qdrant vector store over gRPC
//!
//! Each point carries a flat payload `{text, source, page_label}`. Collections
//! are created with cosine distance the first time a point is written, sized
//! from that point's vector. Every call is retried on transient gRPC statuses.

use async_trait::async_trait;
use parking_lot::Mutex;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use std::collections::{HashMap, HashSet};

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::types::{ChunkPayload, RetrievedChunk, VectorPoint};

use super::retry::{retry_request, RetryError};
use super::vector_store::VectorStoreProvider;

/// gRPC status codes worth another attempt:
/// DEADLINE_EXCEEDED, RESOURCE_EXHAUSTED, ABORTED, INTERNAL, UNAVAILABLE
const TRANSIENT_CODES: [i32; 5] = [4, 8, 10, 13, 14];

fn is_transient_code(code: i32) -> bool {
    TRANSIENT_CODES.contains(&code)
}

/// Tag a client error with its stage and whether to try again
fn classify(error: QdrantError, stage: fn(String) -> Error) -> RetryError {
    let transient = match &error {
        QdrantError::ResponseError { status, .. } => is_transient_code(status.code() as i32),
        _ => false,
    };
    let error = stage(error.to_string());
    if transient {
        RetryError::Retryable(error)
    } else {
        RetryError::Fatal(error)
    }
}

/// Qdrant-backed vector store
pub struct QdrantStore {
    client: Qdrant,
    max_retries: u32,
    /// Collections known to exist, to skip the existence check per upsert
    known_collections: Mutex<HashSet<String>>,
}

impl QdrantStore {
    /// Connect using the vector database config
    pub fn new(config: &VectorDbConfig) -> Result<Self> {
        let client = Qdrant::from_url(&config.url)
            .api_key(config.api_key.clone())
            .build()
            .map_err(|e| Error::Config(format!("invalid Qdrant client settings: {}", e)))?;
        Ok(Self::from_client(client, config.max_retries))
    }

    /// Wrap an existing client
    pub fn from_client(client: Qdrant, max_retries: u32) -> Self {
        Self {
            client,
            max_retries,
            known_collections: Mutex::new(HashSet::new()),
        }
    }

    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> Result<()> {
        if self.known_collections.lock().contains(collection) {
            return Ok(());
        }

        let exists = self.collection_exists(collection, Error::StoreWrite).await?;

        if !exists {
            retry_request("Qdrant create collection", self.max_retries, || async {
                self.client
                    .create_collection(
                        CreateCollectionBuilder::new(collection).vectors_config(
                            VectorParamsBuilder::new(dimensions as u64, Distance::Cosine),
                        ),
                    )
                    .await
                    .map_err(|e| classify(e, Error::StoreWrite))
            })
            .await?;
            tracing::info!(collection, dimensions, "Created Qdrant collection");
        }

        self.known_collections.lock().insert(collection.to_string());
        Ok(())
    }

    async fn collection_exists(&self, collection: &str, stage: fn(String) -> Error) -> Result<bool> {
        retry_request("Qdrant collection check", self.max_retries, || async {
            self.client
                .collection_exists(collection)
                .await
                .map_err(|e| classify(e, stage))
        })
        .await
    }
}

fn to_payload(payload: &ChunkPayload) -> Result<Payload> {
    let value = serde_json::to_value(payload)?;
    Payload::try_from(value).map_err(|e| Error::store_write(format!("invalid payload: {}", e)))
}

fn extract_string(value: &QdrantValue) -> Option<String> {
    match &value.kind {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

fn from_payload(payload: &HashMap<String, QdrantValue>) -> ChunkPayload {
    ChunkPayload {
        text: payload.get("text").and_then(extract_string).unwrap_or_default(),
        source: payload.get("source").and_then(extract_string),
        page_label: payload.get("page_label").and_then(extract_string),
    }
}

#[async_trait]
impl VectorStoreProvider for QdrantStore {
    async fn upsert(&self, collection: &str, point: VectorPoint) -> Result<()> {
        if point.vector.is_empty() {
            return Err(Error::store_write("point has an empty vector"));
        }
        self.ensure_collection(collection, point.vector.len()).await?;

        let payload = to_payload(&point.payload)?;
        let qdrant_point = PointStruct::new(point.id.to_string(), point.vector, payload);

        retry_request("Qdrant upsert", self.max_retries, || async {
            self.client
                .upsert_points(
                    UpsertPointsBuilder::new(collection, vec![qdrant_point.clone()]).wait(true),
                )
                .await
                .map_err(|e| classify(e, Error::StoreWrite))
        })
        .await?;

        tracing::debug!(collection, id = %point.id, "Upserted point");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        if !self.collection_exists(collection, Error::StoreQuery).await? {
            tracing::debug!(collection, "Collection does not exist yet");
            return Ok(Vec::new());
        }

        let response = retry_request("Qdrant search", self.max_retries, || async {
            self.client
                .search_points(
                    SearchPointsBuilder::new(collection, query_embedding.to_vec(), top_k as u64)
                        .with_payload(true),
                )
                .await
                .map_err(|e| classify(e, Error::StoreQuery))
        })
        .await?;

        Ok(response
            .result
            .into_iter()
            .map(|scored| RetrievedChunk {
                payload: from_payload(&scored.payload),
                score: scored.score,
            })
            .collect())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        if !self.collection_exists(collection, Error::StoreQuery).await? {
            return Ok(0);
        }

        let response = retry_request("Qdrant count", self.max_retries, || async {
            self.client
                .count(CountPointsBuilder::new(collection).exact(true))
                .await
                .map_err(|e| classify(e, Error::StoreQuery))
        })
        .await?;
        Ok(response.result.map_or(0, |r| r.count as usize))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.client.health_check().await.is_ok())
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trips_through_qdrant_values() {
        let payload = ChunkPayload {
            text: "Mitochondria produce ATP".to_string(),
            source: Some("bio.pdf".to_string()),
            page_label: Some("3".to_string()),
        };
        let qdrant_payload = to_payload(&payload).unwrap();
        let map: HashMap<String, QdrantValue> = qdrant_payload.into();
        assert_eq!(from_payload(&map), payload);
    }

    #[test]
    fn test_transient_status_codes() {
        assert!(is_transient_code(14));
        assert!(is_transient_code(4));
        assert!(!is_transient_code(3));
        assert!(!is_transient_code(5));
    }

    #[tokio::test]
    async fn test_unreachable_server_keeps_query_stage_after_retries() {
        let store = QdrantStore::new(&VectorDbConfig {
            url: "http://127.0.0.1:9".to_string(),
            max_retries: 1,
            ..VectorDbConfig::default()
        })
        .unwrap();

        let err = store.search("notes", &[0.1, 0.2], 4).await.unwrap_err();
        assert_eq!(err.stage(), Some(crate::error::Stage::StoreQuery));

        let err = store
            .upsert(
                "notes",
                VectorPoint::new(
                    vec![0.1, 0.2],
                    ChunkPayload {
                        text: "Osmosis".to_string(),
                        source: None,
                        page_label: None,
                    },
                ),
            )
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(crate::error::Stage::StoreWrite));
    }

    #[test]
    fn test_foreign_payload_without_provenance() {
        let mut map = HashMap::new();
        map.insert("text".to_string(), QdrantValue::from("orphan"));
        let payload = from_payload(&map);
        assert_eq!(payload.text, "orphan");
        assert_eq!(payload.source_or_default(), "N/A");
        assert_eq!(payload.page_label_or_default(), "N/A");
    }
}
