//! Evaluation harness tests over the real search pipeline.

mod common;

use std::path::Path;
use std::sync::Arc;

use common::VocabProvider;
use resumatch::config::SearchConfig;
use resumatch::corpus::{Corpus, DirectorySource};
use resumatch::eval::{evaluate, EvalError, LabeledQuery};
use resumatch::index::IndexStore;
use resumatch::search::SemanticSearcher;
use tempfile::TempDir;

fn write_resume(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

struct Fixture {
    searcher: SemanticSearcher,
    corpus: Corpus,
    _corpus_dir: TempDir,
    _index_dir: TempDir,
}

fn fixture() -> Fixture {
    let corpus_dir = TempDir::new().unwrap();
    write_resume(corpus_dir.path(), "a.txt", "software engineer python backend");
    write_resume(corpus_dir.path(), "b.txt", "chef culinary kitchen");
    write_resume(corpus_dir.path(), "c.txt", "data scientist python");

    let index_dir = TempDir::new().unwrap();
    let searcher = SemanticSearcher::new(
        Arc::new(VocabProvider::jobs()),
        IndexStore::new(index_dir.path().join("test.index")),
        SearchConfig::default(),
    );
    let source = DirectorySource::new(corpus_dir.path());
    let corpus = Corpus::from_source(&source).unwrap();

    Fixture {
        searcher,
        corpus,
        _corpus_dir: corpus_dir,
        _index_dir: index_dir,
    }
}

#[test]
fn test_matching_expectations_score_one() {
    let fixture = fixture();
    let (index, _) = fixture.searcher.get_or_build(&fixture.corpus).unwrap();
    let mut runner = fixture.searcher.bind(&fixture.corpus, index, 1);

    let queries = vec![
        "python backend engineer".to_string(),
        "culinary chef".to_string(),
    ];
    let expected = vec![vec!["a.txt".to_string()], vec!["b.txt".to_string()]];

    let metrics = evaluate(&queries, &expected, &mut runner).unwrap();
    assert_eq!(metrics.precision, 1.0);
    assert_eq!(metrics.recall, 1.0);
    assert_eq!(metrics.f1, 1.0);
    assert_eq!(metrics.mrr, 1.0);
}

#[test]
fn test_wrong_expectations_score_zero() {
    let fixture = fixture();
    let (index, _) = fixture.searcher.get_or_build(&fixture.corpus).unwrap();
    let mut runner = fixture.searcher.bind(&fixture.corpus, index, 1);

    // Top hit for a culinary query is b.txt, never a.txt
    let queries = vec!["culinary chef kitchen".to_string()];
    let expected = vec![vec!["a.txt".to_string()]];

    let metrics = evaluate(&queries, &expected, &mut runner).unwrap();
    assert_eq!(metrics.precision, 0.0);
    assert_eq!(metrics.recall, 0.0);
    assert_eq!(metrics.f1, 0.0);
    assert_eq!(metrics.mrr, 0.0);
}

#[test]
fn test_no_expected_documents_does_not_raise() {
    let fixture = fixture();
    let (index, _) = fixture.searcher.get_or_build(&fixture.corpus).unwrap();
    let mut runner = fixture.searcher.bind(&fixture.corpus, index, 3);

    let queries = vec!["python engineer".to_string()];
    let expected = vec![vec![]];

    let metrics = evaluate(&queries, &expected, &mut runner).unwrap();
    assert_eq!(metrics.precision, 0.0);
    assert!(metrics.recall.is_nan());
    assert_eq!(metrics.mrr, 0.0);
}

#[test]
fn test_empty_batch_does_not_raise() {
    let fixture = fixture();
    let (index, _) = fixture.searcher.get_or_build(&fixture.corpus).unwrap();
    let mut runner = fixture.searcher.bind(&fixture.corpus, index, 3);

    let metrics = evaluate(&[], &[], &mut runner).unwrap();
    assert!(metrics.precision.is_nan());
    assert!(metrics.recall.is_nan());
    assert!(metrics.f1.is_nan());
    assert!(metrics.mrr.is_nan());
}

#[test]
fn test_length_mismatch_is_rejected() {
    let fixture = fixture();
    let (index, _) = fixture.searcher.get_or_build(&fixture.corpus).unwrap();
    let mut runner = fixture.searcher.bind(&fixture.corpus, index, 3);

    let queries = vec!["python".to_string(), "chef".to_string()];
    let expected = vec![vec!["a.txt".to_string()]];

    let result = evaluate(&queries, &expected, &mut runner);
    assert!(matches!(result, Err(EvalError::LengthMismatch { .. })));
}

#[test]
fn test_mrr_reflects_rank_of_first_relevant() {
    let fixture = fixture();
    let (index, _) = fixture.searcher.get_or_build(&fixture.corpus).unwrap();
    let mut runner = fixture.searcher.bind(&fixture.corpus, index, 2);

    // "python" ranks a.txt and c.txt above b.txt; expecting only the
    // second-ranked hit gives a reciprocal rank of 1/2.
    let queries = vec!["python".to_string()];
    let retrieved_second = {
        use resumatch::eval::QueryRunner;
        runner.retrieve("python").unwrap()[1].clone()
    };
    let expected = vec![vec![retrieved_second]];

    let metrics = evaluate(&queries, &expected, &mut runner).unwrap();
    assert_eq!(metrics.mrr, 0.5);
}

#[test]
fn test_fixture_file_shape_parses() {
    let raw = r#"[
        {"query": "python backend engineer", "expected": ["a.txt"]},
        {"query": "head chef", "expected": ["b.txt"]}
    ]"#;
    let labeled: Vec<LabeledQuery> = serde_json::from_str(raw).unwrap();
    assert_eq!(labeled.len(), 2);
    assert_eq!(labeled[0].expected, vec!["a.txt".to_string()]);
}
