//! Resume corpus loading and fingerprinting
//!
//! A corpus is an ordered sequence of documents; the order is fixed by the
//! loader's enumeration and is the order index rows are built in. The
//! fingerprint over (id, cleaned text) pairs is what `get_or_build` checks
//! a persisted index against.

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::normalize::Normalizer;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Corpus directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Failed to enumerate corpus directory {path}: {source}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

/// A single candidate document.
///
/// Identity is the id (source filename). `cleaned_text` is derived from
/// `raw_text` at load time and is what gets embedded and displayed.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub raw_text: String,
    pub cleaned_text: String,
}

/// Source of ordered (id, raw text) pairs.
///
/// Enumeration order must be deterministic per call. A failure to extract
/// one document must not abort the whole listing.
pub trait DocumentSource {
    fn list_documents(&self) -> Result<Vec<(String, String)>, CorpusError>;
}

/// Loads `.txt` files from a directory, ordered by filename.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentSource for DirectorySource {
    fn list_documents(&self) -> Result<Vec<(String, String)>, CorpusError> {
        if !self.root.is_dir() {
            return Err(CorpusError::SourceNotFound(self.root.clone()));
        }

        let entries = std::fs::read_dir(&self.root).map_err(|e| CorpusError::Io {
            source: e,
            path: self.root.clone(),
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file() && path.extension().map(|ext| ext == "txt").unwrap_or(false)
            })
            .collect();
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let id = match path.file_name().and_then(|name| name.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    warn!("Skipping document with non-UTF8 filename: {:?}", path);
                    continue;
                }
            };

            // Skip-and-log: one unreadable file must not abort the listing.
            match std::fs::read_to_string(&path) {
                Ok(text) => documents.push((id, text)),
                Err(e) => warn!("Skipping unreadable document {}: {}", id, e),
            }
        }

        debug!(
            "Enumerated {} documents from {:?}",
            documents.len(),
            self.root
        );
        Ok(documents)
    }
}

/// Ordered corpus of documents with an id lookup table.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<Document>,
    by_id: AHashMap<String, usize>,
}

impl Corpus {
    /// Load and normalize all documents from a source, preserving the
    /// source's enumeration order.
    pub fn from_source(source: &dyn DocumentSource) -> Result<Self, CorpusError> {
        let normalizer = Normalizer::instance();
        let documents = source
            .list_documents()?
            .into_iter()
            .map(|(id, raw_text)| {
                let cleaned_text = normalizer.normalize(&raw_text);
                Document {
                    id,
                    raw_text,
                    cleaned_text,
                }
            })
            .collect();
        Ok(Self::from_documents(documents))
    }

    pub fn from_documents(documents: Vec<Document>) -> Self {
        let by_id = documents
            .iter()
            .enumerate()
            .map(|(position, doc)| (doc.id.clone(), position))
            .collect();
        Self { documents, by_id }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.by_id.get(id).map(|&position| &self.documents[position])
    }

    /// Fingerprint over ordered (id, cleaned text) pairs.
    ///
    /// Fields are length-prefixed so distinct corpora cannot collide by
    /// concatenation.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        for doc in &self.documents {
            hasher.update(&(doc.id.len() as u64).to_le_bytes());
            hasher.update(doc.id.as_bytes());
            hasher.update(&(doc.cleaned_text.len() as u64).to_le_bytes());
            hasher.update(doc.cleaned_text.as_bytes());
        }
        *hasher.finalize().as_bytes()
    }
}
