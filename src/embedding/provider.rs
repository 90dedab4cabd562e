//! Embedding provider trait and FastEmbed implementation

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// The embedding backend cannot be reached or failed to produce output.
    /// Fatal for the calling operation; never silently recovered.
    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Raw embedding-model capability
///
/// Implementations return unnormalized model output for non-empty text.
/// The dimension is fixed for the process lifetime. Empty-input policy and
/// L2 scaling live in [`super::Embedder`], not here.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate a raw embedding for a single text
    fn raw_embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Generate raw embeddings for multiple texts (batched for efficiency)
    fn raw_embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// FastEmbed provider for local embedding generation
///
/// Uses all-MiniLM-L6-v2 (384 dimensions) by default. Models are downloaded
/// on demand to `~/.cache/huggingface/` on first use; the smallest is ~90MB.
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
    model_name: String,
    dimension: usize,
}

impl FastEmbedProvider {
    /// Create a new FastEmbed provider with the specified model
    pub fn new(model_name: &str) -> Result<Self, EmbeddingError> {
        let embedding_model = match model_name {
            "all-MiniLM-L6-v2" | "all-minilm-l6-v2" => EmbeddingModel::AllMiniLML6V2,
            "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
            "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
            _ => {
                return Err(EmbeddingError::ModelUnavailable(format!(
                    "Unsupported model: {}. Supported: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5",
                    model_name
                )));
            }
        };

        let dimension = match embedding_model {
            EmbeddingModel::BGEBaseENV15 => 768,
            _ => 384,
        };

        tracing::info!(
            "Initializing embedding model: {} ({}D, downloaded on first use)",
            model_name,
            dimension
        );

        let init_options = InitOptions::new(embedding_model).with_show_download_progress(true);

        let model = TextEmbedding::try_new(init_options)
            .map_err(|e| EmbeddingError::ModelUnavailable(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
            model_name: model_name.to_string(),
            dimension,
        })
    }

    /// Create provider with default model (all-MiniLM-L6-v2)
    pub fn with_default_model() -> Result<Self, EmbeddingError> {
        Self::new("all-MiniLM-L6-v2")
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn raw_embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embeddings = self
            .model
            .embed(vec![text.to_string()], None)
            .map_err(|e| EmbeddingError::ModelUnavailable(e.to_string()))?;

        let embedding = embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::ModelUnavailable("no embeddings generated".into()))?;

        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }

    fn raw_embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::ModelUnavailable(e.to_string()))?;

        for embedding in &embeddings {
            if embedding.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
