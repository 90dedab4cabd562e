use std::path::PathBuf;
use thiserror::Error;

use crate::corpus::CorpusError;
use crate::embedding::EmbeddingError;
use crate::eval::EvalError;
use crate::index::IndexError;
use crate::search::SearchError;

/// Main error type for the resumatch application
#[derive(Error, Debug)]
pub enum ResumatchError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// Malformed or missing caller input (e.g. an empty job description)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Corpus loading errors
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    /// Embedding generation errors
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Vector index errors
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Search errors
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Evaluation errors
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for resumatch operations
pub type Result<T> = std::result::Result<T, ResumatchError>;
