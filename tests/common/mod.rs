//! Shared test support: a deterministic, offline embedding backend
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use resumatch::embedding::{EmbeddingError, EmbeddingProvider};

/// Fixed vocabulary covering the test corpora.
pub const JOBS_VOCAB: &[&str] = &[
    "software",
    "engineer",
    "python",
    "backend",
    "data",
    "scientist",
    "chef",
    "culinary",
    "kitchen",
    "react",
    "frontend",
];

/// Counts tokens against a fixed vocabulary, one axis per word.
///
/// Raw output is an unnormalized term-count vector, so ranking by inner
/// product after unit scaling follows token overlap. Tracks batch calls so
/// tests can assert whether an index was rebuilt or reused.
pub struct VocabProvider {
    vocab: Vec<&'static str>,
    batch_calls: AtomicUsize,
}

impl VocabProvider {
    pub fn new(vocab: &[&'static str]) -> Self {
        Self {
            vocab: vocab.to_vec(),
            batch_calls: AtomicUsize::new(0),
        }
    }

    pub fn jobs() -> Self {
        Self::new(JOBS_VOCAB)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for VocabProvider {
    fn raw_embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0; self.vocab.len()];
        for token in text.split_whitespace() {
            if let Some(axis) = self.vocab.iter().position(|word| *word == token) {
                vector[axis] += 1.0;
            }
        }
        Ok(vector)
    }

    fn raw_embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        texts.iter().map(|text| self.raw_embed(text)).collect()
    }

    fn dimension(&self) -> usize {
        self.vocab.len()
    }

    fn model_name(&self) -> &str {
        "vocab-count"
    }
}
