//! Flat vector index and on-disk persistence
//!
//! The index is exact: vectors are L2-normalized, so inner product equals
//! cosine similarity and a flat matrix-vector product gives the true
//! ranking. Immutable once built; reconciled with a changed corpus only by
//! rebuilding.

mod flat;
mod store;

pub use flat::{DocumentEmbedding, FlatIndex, IndexHit};
pub use store::{IndexHandle, IndexStore};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Cannot build an index over an empty corpus")]
    EmptyCorpus,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index does not match corpus: {0}")]
    IndexCorpusMismatch(String),

    #[error("Corrupt index file {path}: {reason}")]
    CorruptIndex { path: PathBuf, reason: String },

    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },
}

/// Configuration for the persisted index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Canonical path of the persisted index file
    pub path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("resumatch.index"),
        }
    }
}
