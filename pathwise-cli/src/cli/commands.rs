//! Command implementations and argument parsing for the pathwise CLI.

use std::{
    io::{self, Write},
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use pathwise_candidates::Algorithm;
use pathwise_core::{
    Corpus, CorpusError, CorpusLayout, DifferentialReport, DifferentialRunner, EquivalenceClass,
    GenerationError, GeneratorConfig, GraphGenerator, GraphRequest, OracleError, PathResult,
    RunnerConfig, RunnerError, build_test_case, floyd_warshall_with_paths_checked, load_corpus,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_CASE_COUNT: &str = "10";
const DEFAULT_SAMPLES_PER_CASE: &str = "10";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "pathwise",
    about = "Differential testing for shortest-path algorithms."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate graphs for an equivalence class and store them with their oracle matrices.
    Generate(GenerateCommand),
    /// Check a bundled algorithm against a stored corpus.
    Verify(VerifyCommand),
    /// Print the oracle's shortest path between two nodes of a stored case.
    Path(PathCommand),
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Equivalence class name, e.g. `sparse-non-negative` or `mixed`.
    #[arg(long)]
    pub class: EquivalenceClass,

    /// Number of graphs to generate.
    #[arg(long, default_value = DEFAULT_CASE_COUNT)]
    pub count: NonZeroUsize,

    /// Fixed node count for every graph; omitted, the batch ranges apply.
    #[arg(long)]
    pub nodes: Option<usize>,

    /// Edge probability for unconstrained classes; only used with `--nodes`.
    #[arg(long, requires = "nodes")]
    pub edge_probability: Option<f64>,

    /// Random seed.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Corpus root; files land in `<root>/classN/`.
    #[arg(long, default_value = "corpus")]
    pub root: PathBuf,

    /// Flips allowed per repair loop before the sample is redrawn.
    #[arg(long)]
    pub max_repair_steps: Option<usize>,

    /// Whole-graph samples drawn before generation gives up.
    #[arg(long)]
    pub max_resamples: Option<NonZeroUsize>,
}

/// Options accepted by the `verify` command.
#[derive(Debug, Args, Clone)]
pub struct VerifyCommand {
    /// Corpus file to verify against.
    pub corpus: PathBuf,

    /// Algorithm under test.
    #[arg(long, value_enum)]
    pub algorithm: AlgorithmArg,

    /// Node pairs sampled per case.
    #[arg(long, default_value = DEFAULT_SAMPLES_PER_CASE)]
    pub samples: NonZeroUsize,

    /// Random seed for pair sampling.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Stop at the first disagreement.
    #[arg(long)]
    pub fail_fast: bool,
}

/// Options accepted by the `path` command.
#[derive(Debug, Args, Clone)]
pub struct PathCommand {
    /// Corpus file holding the case.
    pub corpus: PathBuf,

    /// Zero-based case index within the corpus.
    #[arg(long, default_value_t = 0)]
    pub case: usize,

    /// Start node.
    #[arg(long)]
    pub start: usize,

    /// End node.
    #[arg(long)]
    pub end: usize,

    /// Print the path as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Bundled algorithms selectable from the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlgorithmArg {
    /// Array-scan Dijkstra.
    Dijkstra,
    /// Round-based Bellman-Ford.
    BellmanFord,
    /// Queue-based Bellman-Ford.
    Spfa,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Dijkstra => Self::Dijkstra,
            AlgorithmArg::BellmanFord => Self::BellmanFord,
            AlgorithmArg::Spfa => Self::Spfa,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or storing a corpus failed.
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    /// Graph generation failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// The oracle rejected the case.
    #[error(transparent)]
    Oracle(#[from] OracleError),
    /// The differential run could not start.
    #[error(transparent)]
    Runner(#[from] RunnerError),
    /// The requested case index does not exist.
    #[error("case {index} is out of range for a corpus of {cases} cases")]
    CaseOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of cases in the corpus.
        cases: usize,
    },
    /// The path could not be encoded as JSON.
    #[error("failed to encode path: {0}")]
    Encode(#[source] serde_json::Error),
    /// Writing the summary failed.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

impl CliError {
    /// Returns the stable code of the wrapped library error, if any.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Corpus(err) => Some(err.code().as_str()),
            Self::Generation(err) => Some(err.code().as_str()),
            Self::Oracle(err) => Some(err.code().as_str()),
            Self::Runner(err) => Some(err.code().as_str()),
            Self::CaseOutOfRange { .. } | Self::Encode(_) | Self::Output(_) => None,
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// A corpus was generated and stored.
    Generated {
        /// File the corpus was written to.
        path: PathBuf,
        /// Resolved class of every case, in order.
        classes: Vec<EquivalenceClass>,
    },
    /// A candidate was checked against a corpus.
    Verified {
        /// Algorithm under test.
        algorithm: Algorithm,
        /// Outcome of the differential run.
        report: DifferentialReport,
    },
    /// An oracle path was reconstructed.
    Path {
        /// Reconstructed path.
        result: PathResult,
        /// Render as JSON.
        json: bool,
    },
}

impl ExecutionSummary {
    /// Returns `false` when a verification found disagreements.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        match self {
            Self::Verified { report, .. } => report.passed(),
            Self::Generated { .. } | Self::Path { .. } => true,
        }
    }
}

/// Executes the CLI command represented by `cli`.
///
/// A verification that finds disagreements still returns a summary; check
/// [`ExecutionSummary::succeeded`].
///
/// # Errors
/// Returns [`CliError`] when generation, persistence, validation, or path
/// reconstruction fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::num::NonZeroUsize;
/// # use pathwise_cli::cli::{Cli, Command, ExecutionSummary, GenerateCommand, run_cli};
/// # use pathwise_core::EquivalenceClass;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let root = tempfile::tempdir()?;
/// let cli = Cli {
///     command: Command::Generate(GenerateCommand {
///         class: EquivalenceClass::NonNegative,
///         count: NonZeroUsize::new(3).ok_or("zero")?,
///         nodes: Some(6),
///         edge_probability: None,
///         seed: 1,
///         root: root.path().to_path_buf(),
///         max_repair_steps: None,
///         max_resamples: None,
///     }),
/// };
/// let ExecutionSummary::Generated { path, classes } = run_cli(cli)? else {
///     return Err("expected a generated corpus".into());
/// };
/// assert_eq!(classes.len(), 3);
/// assert!(path.starts_with(root.path().join("class1")));
/// # Ok(())
/// # }
/// ```
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Generate(command) => run_generate(command),
        Command::Verify(command) => run_verify(command),
        Command::Path(command) => run_path(command),
    }
}

#[instrument(
    name = "cli.generate",
    err,
    skip(command),
    fields(class = %command.class, count = command.count.get(), path = field::Empty),
)]
fn run_generate(command: GenerateCommand) -> Result<ExecutionSummary, CliError> {
    let mut config = GeneratorConfig::new(command.seed);
    if let Some(steps) = command.max_repair_steps {
        config = config.with_max_repair_steps(steps);
    }
    if let Some(resamples) = command.max_resamples {
        config = config.with_max_resamples(resamples);
    }
    let mut generator = GraphGenerator::new(config);

    let generated = match command.nodes {
        Some(nodes) => {
            let mut request = GraphRequest::new(nodes);
            if let Some(probability) = command.edge_probability {
                request = request.with_edge_probability(probability);
            }
            (0..command.count.get())
                .map(|_| generator.generate(command.class, request))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => generator.generate_batch(command.class, command.count.get())?,
    };

    let classes = generated.iter().map(|graph| graph.class).collect();
    let corpus: Corpus = generated
        .into_iter()
        .map(|graph| build_test_case(graph.graph, Some(graph.class)))
        .collect();
    let path = CorpusLayout::new(command.root).store(command.class, &corpus)?;
    Span::current().record("path", field::display(path.display()));
    Ok(ExecutionSummary::Generated { path, classes })
}

#[instrument(
    name = "cli.verify",
    err,
    skip(command),
    fields(corpus = %command.corpus.display(), algorithm = field::Empty),
)]
fn run_verify(command: VerifyCommand) -> Result<ExecutionSummary, CliError> {
    let algorithm = Algorithm::from(command.algorithm);
    Span::current().record("algorithm", algorithm.as_str());
    let corpus = load_corpus(&command.corpus)?;
    let config = RunnerConfig::default()
        .with_samples_per_case(command.samples)
        .with_seed(command.seed)
        .with_fail_fast(command.fail_fast);
    let candidate = algorithm.candidate();

    let report = match DifferentialRunner::new(config).run(&corpus, Some(candidate.as_ref())) {
        Ok(report) | Err(RunnerError::Assertions(report)) => report,
        Err(err) => return Err(err.into()),
    };
    info!(passed = report.passed(), "verification finished");
    Ok(ExecutionSummary::Verified { algorithm, report })
}

#[instrument(name = "cli.path", err, skip(command), fields(case = command.case))]
fn run_path(command: PathCommand) -> Result<ExecutionSummary, CliError> {
    let corpus = load_corpus(&command.corpus)?;
    let case = corpus
        .cases()
        .get(command.case)
        .ok_or(CliError::CaseOutOfRange {
            index: command.case,
            cases: corpus.len(),
        })?;
    let paths = floyd_warshall_with_paths_checked(case.graph())?;
    let result = paths.path(command.start, command.end)?;
    Ok(ExecutionSummary::Path {
        result,
        json: command.json,
    })
}

/// Renders `summary` to `writer` in a human-readable text format, or as JSON
/// for paths requested with `--json`.
///
/// # Errors
/// Returns [`CliError::Encode`] when JSON encoding fails and
/// [`CliError::Output`] when writing fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> Result<(), CliError> {
    let result = match summary {
        ExecutionSummary::Generated { path, classes } => {
            render_generated(path, classes, &mut writer)
        }
        ExecutionSummary::Verified { algorithm, report } => {
            render_report(*algorithm, report, &mut writer)
        }
        ExecutionSummary::Path { result, json: true } => {
            let text = serde_json::to_string_pretty(result).map_err(CliError::Encode)?;
            writeln!(writer, "{text}")
        }
        ExecutionSummary::Path { result, json: false } => render_path(result, &mut writer),
    };
    result.map_err(CliError::Output)
}

fn render_generated(
    path: &Path,
    classes: &[EquivalenceClass],
    writer: &mut impl Write,
) -> io::Result<()> {
    writeln!(writer, "wrote {} cases to {}", classes.len(), path.display())?;
    for class in EquivalenceClass::ALL {
        let count = classes.iter().filter(|resolved| **resolved == class).count();
        if count > 0 {
            writeln!(writer, "{class}\t{count}")?;
        }
    }
    Ok(())
}

fn render_report(
    algorithm: Algorithm,
    report: &DifferentialReport,
    writer: &mut impl Write,
) -> io::Result<()> {
    writeln!(writer, "algorithm: {algorithm}")?;
    writeln!(
        writer,
        "cases: {} tested, {} skipped",
        report.cases_tested(),
        report.cases_skipped()
    )?;
    writeln!(writer, "samples: {}", report.samples())?;
    writeln!(writer, "failures: {}", report.failures().len())?;
    for failure in report.failures() {
        writeln!(writer, "  {failure}")?;
    }
    Ok(())
}

fn render_path(result: &PathResult, writer: &mut impl Write) -> io::Result<()> {
    if !result.is_reachable() {
        return writeln!(writer, "unreachable");
    }
    writeln!(writer, "distance: {}", result.distance)?;
    for hop in &result.hops {
        writeln!(writer, "{} -> {}\t{}", hop.from, hop.to, hop.weight)?;
    }
    Ok(())
}
