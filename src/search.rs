//! Semantic search over the resume corpus
//!
//! Owns the index lifecycle (build, cached load, refresh) and the
//! query-side pipeline: normalize and embed the job description, run exact
//! top-k retrieval, map hits back to documents.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::corpus::{Corpus, CorpusError, DocumentSource};
use crate::embedding::{Embedder, EmbeddingError, EmbeddingProvider};
use crate::eval::QueryRunner;
use crate::index::{DocumentEmbedding, FlatIndex, IndexError, IndexHandle, IndexStore};

#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// A search result mapped back to its document.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub content: String,
}

/// Boundary-facing result row: id, score, and a display snippet.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResume {
    pub id: String,
    pub score: f32,
    pub snippet: String,
}

/// Semantic searcher over a file-backed flat index.
pub struct SemanticSearcher {
    embedder: Embedder,
    store: IndexStore,
    config: SearchConfig,
}

impl SemanticSearcher {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        store: IndexStore,
        config: SearchConfig,
    ) -> Self {
        Self {
            embedder: Embedder::new(provider),
            store,
            config,
        }
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    /// Build an index from the corpus in one step: embeddings are computed
    /// in corpus order and paired with their document ids row by row.
    ///
    /// A single document embedding failure aborts the whole build.
    pub fn build(&self, corpus: &Corpus) -> Result<FlatIndex, SearchError> {
        if corpus.is_empty() {
            return Err(IndexError::EmptyCorpus.into());
        }

        let texts: Vec<String> = corpus
            .documents()
            .iter()
            .map(|doc| doc.cleaned_text.clone())
            .collect();
        let embeddings = self.embedder.embed_all(&texts)?;
        let entries: Vec<DocumentEmbedding> = corpus
            .documents()
            .iter()
            .zip(embeddings)
            .map(|(doc, vector)| DocumentEmbedding {
                id: doc.id.clone(),
                vector,
            })
            .collect();

        let index = FlatIndex::new(entries, self.embedder.dimension())?;
        info!(
            "Built index: {} documents, {}D embeddings",
            index.len(),
            index.dimension()
        );
        Ok(index)
    }

    /// Unconditionally rebuild from the corpus and persist, replacing any
    /// prior index. The only supported way to reconcile index and corpus
    /// after a corpus change.
    pub fn refresh(&self, corpus: &Corpus) -> Result<(FlatIndex, IndexHandle), SearchError> {
        let index = self.build(corpus)?;
        let handle = self.store.persist(&index, &corpus.fingerprint())?;
        Ok((index, handle))
    }

    /// Return the persisted index if it matches the corpus fingerprint;
    /// otherwise rebuild and persist.
    pub fn get_or_build(&self, corpus: &Corpus) -> Result<(FlatIndex, IndexHandle), SearchError> {
        if self.store.exists() {
            let (index, handle) = self.store.load()?;
            if handle.corpus_fingerprint == corpus.fingerprint() {
                debug!("Reusing persisted index at {:?}", handle.path);
                return Ok((index, handle));
            }
            info!("Corpus changed since last build, rebuilding index");
        }
        self.refresh(corpus)
    }

    /// Exact top-k retrieval, with each hit mapped back to its document.
    pub fn search(
        &self,
        index: &FlatIndex,
        query_embedding: &[f32],
        corpus: &Corpus,
        k: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        if index.len() != corpus.len() {
            return Err(IndexError::IndexCorpusMismatch(format!(
                "index has {} rows, corpus has {} documents",
                index.len(),
                corpus.len()
            ))
            .into());
        }

        index
            .top_k(query_embedding, k)?
            .into_iter()
            .map(|hit| {
                let doc = corpus.get(&hit.id).ok_or_else(|| {
                    IndexError::IndexCorpusMismatch(format!(
                        "indexed document {:?} is not in the corpus",
                        hit.id
                    ))
                })?;
                Ok(SearchHit {
                    id: hit.id,
                    score: hit.score,
                    content: doc.cleaned_text.clone(),
                })
            })
            .collect()
    }

    /// Boundary operation: rank the corpus against a job description.
    ///
    /// Re-enumerates the corpus, reuses or rebuilds the persisted index,
    /// and shapes results for display.
    pub fn query(
        &self,
        source: &dyn DocumentSource,
        jd_text: &str,
        k: usize,
    ) -> Result<Vec<RankedResume>, SearchError> {
        let corpus = Corpus::from_source(source)?;
        let (index, _handle) = self.get_or_build(&corpus)?;

        let query_embedding = self.embedder.embed(jd_text)?;
        let hits = self.search(&index, &query_embedding, &corpus, k)?;

        Ok(hits
            .into_iter()
            .map(|hit| RankedResume {
                id: hit.id,
                score: hit.score,
                snippet: hit.content.chars().take(self.config.snippet_chars).collect(),
            })
            .collect())
    }

    /// Bind this searcher to a fixed corpus and index for repeated
    /// evaluation queries.
    pub fn bind<'a>(
        &'a self,
        corpus: &'a Corpus,
        index: FlatIndex,
        limit: usize,
    ) -> BoundSearcher<'a> {
        BoundSearcher {
            searcher: self,
            corpus,
            index,
            limit,
        }
    }
}

/// A searcher bound to one corpus/index pair; the search capability the
/// evaluation harness consumes.
pub struct BoundSearcher<'a> {
    searcher: &'a SemanticSearcher,
    corpus: &'a Corpus,
    index: FlatIndex,
    limit: usize,
}

impl QueryRunner for BoundSearcher<'_> {
    fn retrieve(&mut self, query: &str) -> Result<Vec<String>, SearchError> {
        let embedding = self.searcher.embedder.embed(query)?;
        let hits = self
            .searcher
            .search(&self.index, &embedding, self.corpus, self.limit)?;
        Ok(hits.into_iter().map(|hit| hit.id).collect())
    }
}
