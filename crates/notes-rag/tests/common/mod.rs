//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use notes_rag::providers::{EmbeddingProvider, LlmProvider};
use notes_rag::Result;

/// Letter-frequency embedder: similar wording gives similar vectors
#[derive(Default)]
pub struct LetterEmbedder {
    calls: AtomicUsize,
}

impl LetterEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for LetterEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vector = vec![0.0; 26];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            vector[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Ok(vector)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "letters"
    }
}

/// Records each call and replies with a fixed answer
pub struct RecordingLlm {
    reply: String,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingLlm {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(system_prompt, user_message)` for every call so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for RecordingLlm {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        self.calls
            .lock()
            .push((system_prompt.to_string(), user_message.to_string()));
        Ok(self.reply.clone())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "recording"
    }

    fn model(&self) -> &str {
        "recording-model"
    }
}

/// Text of exactly `len` characters made of space-separated words
pub fn wordy_text(len: usize) -> String {
    let mut text = String::with_capacity(len);
    let mut i = 0;
    while text.len() < len {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&format!("term{:03}", i % 1000));
        i += 1;
    }
    text.truncate(len);
    text
}
