//! Generate, persist, reload, and differential-test a corpus.

mod common;

use std::num::NonZeroUsize;

use common::{MatrixLookup, recompute};
use pathwise_core::{
    Corpus, CorpusLayout, DifferentialRunner, EquivalenceClass, GeneratorConfig, Graph,
    GraphGenerator, GraphRequest, RunnerConfig, RunnerError, build_test_case, load_corpus,
    save_corpus,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

#[fixture]
fn workdir() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

fn sparse_case(seed: u64) -> pathwise_core::TestCase {
    let generated = GraphGenerator::new(GeneratorConfig::new(seed))
        .generate(EquivalenceClass::SparseNonNegative, GraphRequest::new(10))
        .expect("sparse generation succeeds");
    build_test_case(generated.graph, Some(generated.class))
}

#[rstest]
fn sparse_corpus_survives_round_trip_and_validates_exact_candidate(workdir: TempDir) {
    let case = sparse_case(10);
    let lookup = MatrixLookup::new(case.graph());
    let corpus = Corpus::new(vec![case]);

    let path = workdir.path().join("sparse.json");
    save_corpus(&path, &corpus).expect("save succeeds");
    let loaded = load_corpus(&path).expect("load succeeds");
    assert_eq!(loaded, corpus);

    let config = RunnerConfig::default().with_samples_per_case(NonZeroUsize::new(50).expect("non-zero"));
    let report = DifferentialRunner::new(config)
        .run(&loaded, Some(&lookup))
        .expect("matrix lookup agrees with the oracle");
    assert_eq!(report.samples(), 50);
    assert!(report.passed());
}

#[rstest]
fn always_zero_candidate_is_caught(workdir: TempDir) {
    let corpus: Corpus = (0..5).map(sparse_case).collect();
    let path = workdir.path().join("sparse.json");
    save_corpus(&path, &corpus).expect("save succeeds");
    let loaded = load_corpus(&path).expect("load succeeds");

    let has_non_zero = loaded.iter().any(|case| {
        case.matrix()
            .is_some_and(|matrix| matrix.rows().flatten().any(|&cell| cell != 0.0))
    });
    assert!(has_non_zero, "sparse graphs with 10 nodes have non-zero distances");

    let zero = |_: &Graph, _: usize, _: usize| 0.0;
    let config = RunnerConfig::default().with_samples_per_case(NonZeroUsize::new(40).expect("non-zero"));
    let err = DifferentialRunner::new(config)
        .run(&loaded, Some(&zero))
        .expect_err("zero distances are wrong");
    let RunnerError::Assertions(report) = err else {
        panic!("expected assertion failures, got {err:?}");
    };
    assert!(!report.failures().is_empty());
    assert!(
        report
            .failures()
            .iter()
            .all(|failure| failure.class == Some(EquivalenceClass::SparseNonNegative))
    );
}

#[rstest]
#[case(EquivalenceClass::NonNegative)]
#[case(EquivalenceClass::NegativeNoCycle)]
#[case(EquivalenceClass::DenseNegativeNoCycle)]
#[case(EquivalenceClass::Mixed)]
fn layout_store_then_verify(workdir: TempDir, #[case] class: EquivalenceClass) {
    let batch = GraphGenerator::new(GeneratorConfig::new(4))
        .generate_batch(class, 8)
        .expect("batch succeeds");
    let corpus: Corpus = batch
        .into_iter()
        .map(|generated| build_test_case(generated.graph, Some(generated.class)))
        .collect();

    let layout = CorpusLayout::new(workdir.path());
    let first = layout.store(class, &corpus).expect("store succeeds");
    let second = layout.store(class, &corpus).expect("store succeeds");
    let prefix = format!("lite_{}_test_cases", class.legacy_name());
    assert_eq!(
        first.file_name().and_then(|name| name.to_str()),
        Some(format!("{prefix}1.json").as_str())
    );
    assert_eq!(
        second.file_name().and_then(|name| name.to_str()),
        Some(format!("{prefix}2.json").as_str())
    );

    let loaded = load_corpus(&second).expect("load succeeds");
    let report = DifferentialRunner::default()
        .run(&loaded, Some(&recompute))
        .expect("oracle agrees with itself");
    assert_eq!(report.cases_tested() + report.cases_skipped(), 8);
}
