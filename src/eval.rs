//! Retrieval quality evaluation
//!
//! Runs a batch of labeled queries through a search capability and
//! aggregates precision, recall, F1, and mean reciprocal rank.
//!
//! Undefined per-query values (a zero denominator) are recorded as NaN and
//! excluded from the aggregate mean, so one query with no expected
//! documents does not zero out the batch average. A batch with no defined
//! samples for a metric aggregates to NaN; JSON output renders NaN as null.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::search::SearchError;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Evaluation input length mismatch: {queries} queries vs {expected} expected sets")]
    LengthMismatch { queries: usize, expected: usize },

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Search capability consumed by the harness: ordered retrieved ids for a
/// query text. Implemented by `BoundSearcher` and by test stubs.
pub trait QueryRunner {
    fn retrieve(&mut self, query: &str) -> Result<Vec<String>, SearchError>;
}

/// A labeled evaluation query as stored in fixture files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledQuery {
    pub query: String,
    #[serde(default)]
    pub expected: Vec<String>,
}

/// Aggregate retrieval metrics. Values may be NaN when a metric had no
/// defined samples in the batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub mrr: f64,
}

impl Metrics {
    /// JSON form with NaN mapped to null.
    pub fn to_json(&self) -> serde_json::Value {
        fn field(value: f64) -> serde_json::Value {
            if value.is_finite() {
                serde_json::json!(value)
            } else {
                serde_json::Value::Null
            }
        }
        serde_json::json!({
            "precision": field(self.precision),
            "recall": field(self.recall),
            "f1": field(self.f1),
            "mrr": field(self.mrr),
        })
    }
}

/// Evaluate retrieval quality over labeled queries.
///
/// `queries` and `expected` must be parallel sequences. Search failures
/// propagate; an empty batch yields all-NaN metrics without error.
pub fn evaluate(
    queries: &[String],
    expected: &[Vec<String>],
    runner: &mut dyn QueryRunner,
) -> Result<Metrics, EvalError> {
    if queries.len() != expected.len() {
        return Err(EvalError::LengthMismatch {
            queries: queries.len(),
            expected: expected.len(),
        });
    }

    let mut precisions = Vec::with_capacity(queries.len());
    let mut recalls = Vec::with_capacity(queries.len());
    let mut f1s = Vec::with_capacity(queries.len());
    let mut mrrs = Vec::with_capacity(queries.len());

    for (query, expected_ids) in queries.iter().zip(expected) {
        let retrieved = runner.retrieve(query)?;
        let scores = score_query(&retrieved, expected_ids);
        precisions.push(scores.precision);
        recalls.push(scores.recall);
        f1s.push(scores.f1);
        mrrs.push(scores.mrr);
    }

    Ok(Metrics {
        precision: nan_mean(&precisions),
        recall: nan_mean(&recalls),
        f1: nan_mean(&f1s),
        mrr: nan_mean(&mrrs),
    })
}

struct QueryScores {
    precision: f64,
    recall: f64,
    f1: f64,
    mrr: f64,
}

fn score_query(retrieved: &[String], expected: &[String]) -> QueryScores {
    let expected_set: AHashSet<&str> = expected.iter().map(String::as_str).collect();
    let retrieved_set: AHashSet<&str> = retrieved.iter().map(String::as_str).collect();

    let tp = retrieved_set.intersection(&expected_set).count();
    let fp = retrieved_set.len() - tp;
    let fn_ = expected_set.len() - tp;

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);

    let f1 = if precision.is_nan() || recall.is_nan() {
        f64::NAN
    } else if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    // Reciprocal of the 1-based rank of the first relevant retrieved id
    let mrr = retrieved
        .iter()
        .position(|id| expected_set.contains(id.as_str()))
        .map(|rank| 1.0 / (rank as f64 + 1.0))
        .unwrap_or(0.0);

    QueryScores {
        precision,
        recall,
        f1,
        mrr,
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        f64::NAN
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Mean over the finite values; NaN when none are.
fn nan_mean(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.iter().sum::<f64>() / finite.len() as f64
}
