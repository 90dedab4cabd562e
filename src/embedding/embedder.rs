//! Embedding policy layer
//!
//! One contract for every call site: the embedder always normalizes its
//! input with the full [`Normalizer`] pass, for documents and queries
//! alike. If normalization yields the empty string the result is the zero
//! vector and the model is never invoked.

use std::sync::Arc;

use super::{EmbeddingError, EmbeddingProvider};
use crate::normalize::Normalizer;

pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Embed a single text: normalize, generate, scale to unit L2 norm.
    ///
    /// Empty normalized text yields the zero vector of the model dimension.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let cleaned = Normalizer::instance().normalize(text);
        if cleaned.is_empty() {
            return Ok(vec![0.0; self.provider.dimension()]);
        }

        let raw = self.provider.raw_embed(&cleaned)?;
        Ok(l2_normalize(raw))
    }

    /// Embed many texts in one backend batch, preserving input order.
    ///
    /// Texts that normalize to empty get zero vectors without touching the
    /// model; everything else goes through `raw_embed_batch` in one call.
    pub fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let normalizer = Normalizer::instance();
        let dimension = self.provider.dimension();

        let cleaned: Vec<String> = texts.iter().map(|t| normalizer.normalize(t)).collect();
        let non_empty: Vec<String> = cleaned.iter().filter(|t| !t.is_empty()).cloned().collect();

        let mut generated = self
            .provider
            .raw_embed_batch(&non_empty)?
            .into_iter()
            .map(l2_normalize);

        let mut embeddings = Vec::with_capacity(texts.len());
        for text in &cleaned {
            if text.is_empty() {
                embeddings.push(vec![0.0; dimension]);
            } else {
                embeddings.push(generated.next().ok_or_else(|| {
                    EmbeddingError::ModelUnavailable(
                        "backend returned fewer embeddings than requested".into(),
                    )
                })?);
            }
        }

        Ok(embeddings)
    }
}

/// Scale a vector to unit L2 norm. A zero vector stays zero.
fn l2_normalize(vector: Vec<f32>) -> Vec<f32> {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return vector;
    }
    vector.into_iter().map(|x| x / norm).collect()
}
