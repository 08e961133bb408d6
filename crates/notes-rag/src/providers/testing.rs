//! Deterministic collaborators for unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::types::{RetrievedChunk, VectorPoint};

use super::{EmbeddingProvider, LlmProvider, MemoryVectorStore, VectorStoreProvider};

const DIMENSIONS: usize = 32;

/// Bag-of-words embedder: one bucket per hashed lowercase word
#[derive(Default)]
pub struct HashEmbedder {
    calls: AtomicUsize,
    /// Fail every call after this many successes
    fail_after: Option<usize>,
}

impl HashEmbedder {
    pub fn failing_after(successes: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_after: Some(successes),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn hash_vector(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; DIMENSIONS];
    for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        let bucket = word
            .to_lowercase()
            .bytes()
            .fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
        vector[bucket % DIMENSIONS] += 1.0;
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if matches!(self.fail_after, Some(limit) if call >= limit) {
            return Err(Error::embedding("embedding service unavailable"));
        }
        Ok(hash_vector(text))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// LLM that records every call and echoes a fixed reply
pub struct CountingLlm {
    calls: AtomicUsize,
    last_system_prompt: parking_lot::Mutex<Option<String>>,
    reply: Result<String>,
}

impl CountingLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_system_prompt: parking_lot::Mutex::new(None),
            reply: Ok(reply.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_system_prompt: parking_lot::Mutex::new(None),
            reply: Err(Error::generation("model overloaded")),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_system_prompt(&self) -> Option<String> {
        self.last_system_prompt.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for CountingLlm {
    async fn complete(&self, system_prompt: &str, _user_message: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system_prompt.lock() = Some(system_prompt.to_string());
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(e) => Err(Error::generation(e.to_string())),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "counting"
    }

    fn model(&self) -> &str {
        "test-model"
    }
}

/// Memory store whose writes fail after a number of successes
pub struct FlakyStore {
    inner: MemoryVectorStore,
    writes: AtomicUsize,
    fail_writes_after: usize,
}

impl FlakyStore {
    pub fn failing_after(successes: usize) -> Self {
        Self {
            inner: MemoryVectorStore::new(),
            writes: AtomicUsize::new(0),
            fail_writes_after: successes,
        }
    }
}

#[async_trait]
impl VectorStoreProvider for FlakyStore {
    async fn upsert(&self, collection: &str, point: VectorPoint) -> Result<()> {
        if self.writes.fetch_add(1, Ordering::SeqCst) >= self.fail_writes_after {
            return Err(Error::store_write("connection reset"));
        }
        self.inner.upsert(collection, point).await
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        self.inner.search(collection, query_embedding, top_k).await
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        self.inner.count(collection).await
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

/// Store whose searches always fail
pub struct BrokenSearchStore;

#[async_trait]
impl VectorStoreProvider for BrokenSearchStore {
    async fn upsert(&self, _collection: &str, _point: VectorPoint) -> Result<()> {
        Ok(())
    }

    async fn search(&self, _: &str, _: &[f32], _: usize) -> Result<Vec<RetrievedChunk>> {
        Err(Error::store_query("search timed out"))
    }

    async fn count(&self, _collection: &str) -> Result<usize> {
        Ok(0)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "broken"
    }
}
