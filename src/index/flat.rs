//! Exact inner-product index over a flat embedding matrix

use ndarray::{Array2, ArrayView1, ArrayView2};

use super::IndexError;

/// An embedding paired with the document it belongs to. The id travels
/// with its vector from build through retrieval.
#[derive(Debug, Clone)]
pub struct DocumentEmbedding {
    pub id: String,
    pub vector: Vec<f32>,
}

/// A single index hit: matrix row, the document id stored for that row,
/// and the inner-product score.
#[derive(Debug, Clone)]
pub struct IndexHit {
    pub row: usize,
    pub id: String,
    pub score: f32,
}

/// Flat inner-product index
///
/// Built in one step from (id, embedding) pairs and immutable until
/// rebuilt. Exact retrieval: vectors are L2-normalized upstream, so inner
/// product equals cosine similarity and a matrix-vector product gives the
/// true ranking.
pub struct FlatIndex {
    ids: Vec<String>,
    vectors: Array2<f32>,
}

impl FlatIndex {
    /// Build an index from (id, embedding) pairs.
    ///
    /// Fails with `EmptyCorpus` for zero entries and `DimensionMismatch`
    /// for any vector of the wrong length.
    pub fn new(entries: Vec<DocumentEmbedding>, dimension: usize) -> Result<Self, IndexError> {
        if entries.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }

        let mut ids = Vec::with_capacity(entries.len());
        let mut matrix = Array2::zeros((entries.len(), dimension));
        for (row, entry) in entries.into_iter().enumerate() {
            if entry.vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: entry.vector.len(),
                });
            }
            matrix
                .row_mut(row)
                .assign(&ArrayView1::from(&entry.vector[..]));
            ids.push(entry.id);
        }

        Ok(Self {
            ids,
            vectors: matrix,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub(super) fn rows(&self) -> ArrayView2<'_, f32> {
        self.vectors.view()
    }

    /// Exact top-k retrieval by inner product.
    ///
    /// Returns at most `min(k, len)` hits, strictly descending by score;
    /// ties rank by ascending row order (stable sort over row indices), so
    /// the ranking is deterministic for a fixed index state.
    pub fn top_k(&self, query: &[f32], k: usize) -> Result<Vec<IndexHit>, IndexError> {
        if query.len() != self.dimension() {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension(),
                actual: query.len(),
            });
        }

        let scores = self.vectors.dot(&ArrayView1::from(query));

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order.truncate(k);

        Ok(order
            .into_iter()
            .map(|row| IndexHit {
                row,
                id: self.ids[row].clone(),
                score: scores[row],
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(dim: usize, hot: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[hot] = 1.0;
        v
    }

    fn entry(id: &str, vector: Vec<f32>) -> DocumentEmbedding {
        DocumentEmbedding {
            id: id.to_string(),
            vector,
        }
    }

    fn index() -> FlatIndex {
        // a: axis 0, b: axis 1, c: between them, closer to a
        let mut c = vec![0.0; 4];
        c[0] = 0.9;
        c[1] = 0.1;
        FlatIndex::new(
            vec![
                entry("a.txt", unit(4, 0)),
                entry("b.txt", unit(4, 1)),
                entry("c.txt", c),
            ],
            4,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let result = FlatIndex::new(vec![], 4);
        assert!(matches!(result, Err(IndexError::EmptyCorpus)));
    }

    #[test]
    fn test_ragged_vector_rejected() {
        let result = FlatIndex::new(vec![entry("a", unit(4, 0)), entry("b", unit(3, 0))], 4);
        assert!(matches!(result, Err(IndexError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_top_k_ranking() {
        let hits = index().top_k(&unit(4, 0), 3).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a.txt", "c.txt", "b.txt"]);
        assert!(hits[0].score > hits[1].score);
        assert!(hits[1].score > hits[2].score);
    }

    #[test]
    fn test_top_k_truncates_to_corpus_size() {
        let hits = index().top_k(&unit(4, 0), 10).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_top_k_zero() {
        let hits = index().top_k(&unit(4, 0), 0).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = index().top_k(&unit(3, 0), 2);
        assert!(matches!(result, Err(IndexError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_ties_rank_by_row_order() {
        let index = FlatIndex::new(
            vec![
                entry("x", unit(4, 0)),
                entry("y", unit(4, 0)),
                entry("z", unit(4, 0)),
            ],
            4,
        )
        .unwrap();
        let hits = index.top_k(&unit(4, 0), 3).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_zero_query_scores_zero() {
        let hits = index().top_k(&vec![0.0; 4], 3).unwrap();
        assert_eq!(hits.len(), 3);
        for hit in hits {
            assert_eq!(hit.score, 0.0);
        }
    }
}
