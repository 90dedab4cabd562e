//! Embedding generation
//!
//! Split into the raw model capability (`EmbeddingProvider`, with a
//! FastEmbed implementation) and the policy layer (`Embedder`) that owns
//! input normalization, the empty-text zero-vector rule, and L2 scaling.

mod embedder;
mod provider;

pub use embedder::Embedder;
pub use provider::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};

use serde::{Deserialize, Serialize};

/// Configuration for embedding generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name (e.g., "all-MiniLM-L6-v2")
    pub model: String,
    /// Embedding dimension (384 for MiniLM)
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            dimension: 384,
        }
    }
}
