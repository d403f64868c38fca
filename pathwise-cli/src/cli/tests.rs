//! Unit tests for the CLI commands and summary rendering.

use super::{
    AlgorithmArg, Cli, CliError, Command, ExecutionSummary, GenerateCommand, PathCommand,
    VerifyCommand, render_summary, run_cli,
};

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::Parser;
use pathwise_core::{
    Corpus, EquivalenceClass, Graph, OracleError, RunnerError, build_test_case, save_corpus,
};
use pathwise_test_support::tracing::RecordingLayer;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use tracing_subscriber::{Registry, layer::SubscriberExt};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[fixture]
fn workdir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

fn count(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).expect("count must be non-zero")
}

fn generate(root: &Path, class: EquivalenceClass, cases: usize, nodes: Option<usize>) -> Cli {
    Cli {
        command: Command::Generate(GenerateCommand {
            class,
            count: count(cases),
            nodes,
            edge_probability: None,
            seed: 9,
            root: root.to_path_buf(),
            max_repair_steps: None,
            max_resamples: None,
        }),
    }
}

fn verify(corpus: PathBuf, algorithm: AlgorithmArg) -> Cli {
    Cli {
        command: Command::Verify(VerifyCommand {
            corpus,
            algorithm,
            samples: count(64),
            seed: 2,
            fail_fast: false,
        }),
    }
}

fn path(corpus: PathBuf, case: usize, start: usize, end: usize, json: bool) -> Cli {
    Cli {
        command: Command::Path(PathCommand {
            corpus,
            case,
            start,
            end,
            json,
        }),
    }
}

fn write_corpus(dir: &TempDir, name: &str, graphs: Vec<Graph>) -> PathBuf {
    let corpus: Corpus = graphs
        .into_iter()
        .map(|graph| build_test_case(graph, None))
        .collect();
    let path = dir.path().join(name);
    save_corpus(&path, &corpus).expect("corpus must save");
    path
}

fn diamond() -> Graph {
    Graph::directed(4, [(0, 1, 1.0), (0, 2, 4.0), (1, 2, 2.0), (2, 3, 1.0)])
        .expect("graph must build")
}

fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

fn rendered(summary: &ExecutionSummary) -> Result<String, Box<dyn std::error::Error>> {
    let mut buffer = Vec::new();
    render_summary(summary, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[rstest]
fn generate_numbers_files_per_class(workdir: TempDir) -> TestResult {
    let cli = generate(workdir.path(), EquivalenceClass::SparseNonNegative, 4, Some(8));
    let ExecutionSummary::Generated { path: first, classes } = run_cli(cli.clone())? else {
        panic!("expected a generated corpus");
    };
    assert_eq!(classes, vec![EquivalenceClass::SparseNonNegative; 4]);
    assert_eq!(first, workdir.path().join("class3").join("lite_class3_test_cases1.json"));

    let ExecutionSummary::Generated { path: second, .. } = run_cli(cli)? else {
        panic!("expected a generated corpus");
    };
    assert_eq!(second, workdir.path().join("class3").join("lite_class3_test_cases2.json"));
    Ok(())
}

#[rstest]
fn generate_mixed_batch_reports_resolved_classes(workdir: TempDir) -> TestResult {
    let summary = run_cli(generate(workdir.path(), EquivalenceClass::Mixed, 20, None))?;
    let ExecutionSummary::Generated { classes, .. } = &summary else {
        panic!("expected a generated corpus");
    };
    assert_eq!(classes.len(), 20);
    assert!(classes.iter().all(|class| class.is_concrete()));

    let text = rendered(&summary)?;
    assert!(text.starts_with("wrote 20 cases to "));
    assert!(text.contains("negative-cycle\t2"));
    Ok(())
}

#[rstest]
fn generate_surfaces_generation_errors(workdir: TempDir) {
    let cli = generate(workdir.path(), EquivalenceClass::DenseNonNegative, 1, Some(2));
    let err = run_cli_expecting_error(cli, "two nodes cannot be dense");
    assert!(matches!(err, CliError::Generation(_)));
    assert_eq!(err.code(), Some("GENERATION_UNSATISFIABLE_DENSITY"));
}

#[rstest]
#[case(AlgorithmArg::BellmanFord)]
#[case(AlgorithmArg::Spfa)]
fn verify_passes_relaxation_candidates(workdir: TempDir, #[case] algorithm: AlgorithmArg) -> TestResult {
    let generated = run_cli(generate(workdir.path(), EquivalenceClass::NegativeNoCycle, 6, Some(9)))?;
    let ExecutionSummary::Generated { path: corpus, .. } = generated else {
        panic!("expected a generated corpus");
    };
    let summary = run_cli(verify(corpus, algorithm))?;
    assert!(summary.succeeded());
    let text = rendered(&summary)?;
    assert!(text.contains("cases: 6 tested, 0 skipped"));
    assert!(text.contains("samples: 384"));
    assert!(text.contains("failures: 0"));
    Ok(())
}

#[rstest]
fn verify_reports_dijkstra_disagreements(workdir: TempDir) -> TestResult {
    let trap = Graph::directed(3, [(0, 1, 4.0), (0, 2, 5.0), (2, 1, -3.0)])?;
    let corpus = write_corpus(&workdir, "trap.json", vec![trap.clone(), trap]);
    let summary = run_cli(verify(corpus, AlgorithmArg::Dijkstra))?;
    assert!(!summary.succeeded());
    let text = rendered(&summary)?;
    assert!(text.contains("algorithm: dijkstra"));
    assert!(text.contains("distance 0 -> 1 expected 2 but candidate returned 4"));
    Ok(())
}

#[rstest]
fn verify_rejects_empty_corpora(workdir: TempDir) {
    let corpus = write_corpus(&workdir, "empty.json", Vec::new());
    let err = run_cli_expecting_error(verify(corpus, AlgorithmArg::Spfa), "empty corpus must fail");
    assert!(matches!(err, CliError::Runner(RunnerError::EmptyCorpus)));
    assert_eq!(err.code(), Some("RUNNER_EMPTY_CORPUS"));
}

#[rstest]
fn verify_reports_missing_files(workdir: TempDir) {
    let err = run_cli_expecting_error(
        verify(workdir.path().join("absent.json"), AlgorithmArg::Spfa),
        "missing corpus must fail",
    );
    assert_eq!(err.code(), Some("CORPUS_READ"));
}

#[rstest]
fn path_prints_hops_and_distance(workdir: TempDir) -> TestResult {
    let corpus = write_corpus(&workdir, "diamond.json", vec![diamond()]);
    let summary = run_cli(path(corpus, 0, 0, 3, false))?;
    let text = rendered(&summary)?;
    assert_eq!(text, "distance: 4\n0 -> 1\t1\n1 -> 2\t2\n2 -> 3\t1\n");
    Ok(())
}

#[rstest]
fn path_reports_unreachable_targets(workdir: TempDir) -> TestResult {
    let corpus = write_corpus(&workdir, "diamond.json", vec![diamond()]);
    let summary = run_cli(path(corpus, 0, 3, 0, false))?;
    assert_eq!(rendered(&summary)?, "unreachable\n");
    Ok(())
}

#[rstest]
fn path_renders_json(workdir: TempDir) -> TestResult {
    let corpus = write_corpus(&workdir, "diamond.json", vec![diamond()]);
    let summary = run_cli(path(corpus, 0, 0, 2, true))?;
    let value: serde_json::Value = serde_json::from_str(&rendered(&summary)?)?;
    assert_eq!(value["distance"], serde_json::json!(3.0));
    assert_eq!(value["hops"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["hops"][1], serde_json::json!({"from": 1, "to": 2, "weight": 2.0}));
    Ok(())
}

#[rstest]
fn unreachable_path_renders_infinity_token(workdir: TempDir) -> TestResult {
    let corpus = write_corpus(&workdir, "diamond.json", vec![diamond()]);
    let summary = run_cli(path(corpus, 0, 3, 0, true))?;
    let value: serde_json::Value = serde_json::from_str(&rendered(&summary)?)?;
    assert_eq!(value, serde_json::json!({"hops": [], "distance": "inf"}));
    Ok(())
}

#[rstest]
fn path_rejects_negative_cycles(workdir: TempDir) -> TestResult {
    let cycle = Graph::directed(4, [(0, 1, 1.0), (1, 2, 2.0), (2, 3, 3.0), (3, 0, -9.0)])?;
    let corpus = write_corpus(&workdir, "cycle.json", vec![cycle]);
    let err = run_cli_expecting_error(path(corpus, 0, 0, 3, false), "negative cycle must fail");
    assert!(matches!(err, CliError::Oracle(OracleError::NegativeCyclePrecondition)));
    Ok(())
}

#[rstest]
fn path_rejects_unknown_cases(workdir: TempDir) {
    let corpus = write_corpus(&workdir, "diamond.json", vec![diamond()]);
    let err = run_cli_expecting_error(path(corpus, 3, 0, 1, false), "case 3 does not exist");
    assert!(matches!(err, CliError::CaseOutOfRange { index: 3, cases: 1 }));
    assert_eq!(err.code(), None);
}

#[rstest]
#[case::unknown_class(&["pathwise", "generate", "--class", "sparse"])]
#[case::probability_without_nodes(&[
    "pathwise", "generate", "--class", "non-negative", "--edge-probability", "0.5",
])]
#[case::zero_count(&["pathwise", "generate", "--class", "mixed", "--count", "0"])]
#[case::unknown_algorithm(&["pathwise", "verify", "cases.json", "--algorithm", "astar"])]
#[case::missing_end(&["pathwise", "path", "cases.json", "--start", "0"])]
fn clap_rejects_invalid_arguments(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn clap_parses_generate_defaults() {
    let cli = Cli::try_parse_from(["pathwise", "generate", "--class", "dense-non-negative"])
        .expect("arguments must parse");
    let Command::Generate(command) = cli.command else {
        panic!("expected the generate command");
    };
    assert_eq!(command.class, EquivalenceClass::DenseNonNegative);
    assert_eq!(command.count.get(), 10);
    assert_eq!(command.root, PathBuf::from("corpus"));
    assert_eq!(command.nodes, None);
}

#[test]
fn clap_parses_verify_options() {
    let cli = Cli::try_parse_from([
        "pathwise",
        "verify",
        "cases.json",
        "--algorithm",
        "bellman-ford",
        "--samples",
        "25",
        "--fail-fast",
    ])
    .expect("arguments must parse");
    let Command::Verify(command) = cli.command else {
        panic!("expected the verify command");
    };
    assert!(matches!(command.algorithm, AlgorithmArg::BellmanFord));
    assert_eq!(command.samples.get(), 25);
    assert!(command.fail_fast);
}

#[rstest]
fn generate_records_the_written_path(workdir: TempDir) -> TestResult {
    let layer = RecordingLayer::default();
    let subscriber = Registry::default().with(layer.clone());
    let summary = tracing::subscriber::with_default(subscriber, || {
        run_cli(generate(workdir.path(), EquivalenceClass::NonNegative, 2, Some(5)))
    })?;
    let ExecutionSummary::Generated { path: written, .. } = summary else {
        panic!("expected a generated corpus");
    };
    let span = layer.span("cli.generate").expect("generate span closed");
    assert_eq!(span.field("class"), Some("non-negative"));
    let expected = written.display().to_string();
    assert_eq!(span.field("path"), Some(expected.as_str()));
    Ok(())
}
