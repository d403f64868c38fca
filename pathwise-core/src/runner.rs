//! Differential testing of a candidate against corpus oracle matrices.
//!
//! For every case that carries a matrix the runner draws node pairs
//! uniformly with replacement and compares the candidate's answer with the
//! oracle cell: NaN cells require NaN, every other cell (including `+inf`
//! for unreachable pairs) requires exact equality.

use std::{fmt, num::NonZeroUsize};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{Span, debug, field, info, instrument, warn};

use crate::{
    contract::{Candidate, ValidatedCandidate, validate},
    corpus::{Corpus, TestCase},
    error::RunnerError,
    generate::EquivalenceClass,
};

const DEFAULT_SAMPLES_PER_CASE: usize = 10;

/// Sampling parameters for a [`DifferentialRunner`].
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use pathwise_core::RunnerConfig;
///
/// let config = RunnerConfig::default()
///     .with_samples_per_case(NonZeroUsize::new(25).expect("non-zero"))
///     .with_fail_fast(true);
/// assert_eq!(config.samples_per_case().get(), 25);
/// assert!(config.fail_fast());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RunnerConfig {
    samples_per_case: NonZeroUsize,
    seed: u64,
    fail_fast: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            samples_per_case: NonZeroUsize::new(DEFAULT_SAMPLES_PER_CASE)
                .unwrap_or(NonZeroUsize::MIN),
            seed: 0,
            fail_fast: false,
        }
    }
}

impl RunnerConfig {
    /// Overrides the number of node pairs drawn per case.
    #[must_use]
    pub const fn with_samples_per_case(mut self, samples: NonZeroUsize) -> Self {
        self.samples_per_case = samples;
        self
    }

    /// Overrides the pair-sampling seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Stops the run at the first disagreement when `true`.
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Returns the number of pairs drawn per case.
    #[must_use]
    #[rustfmt::skip]
    pub const fn samples_per_case(&self) -> NonZeroUsize { self.samples_per_case }

    /// Returns the pair-sampling seed.
    #[must_use]
    #[rustfmt::skip]
    pub const fn seed(&self) -> u64 { self.seed }

    /// Returns whether the run stops at the first disagreement.
    #[must_use]
    #[rustfmt::skip]
    pub const fn fail_fast(&self) -> bool { self.fail_fast }
}

/// One sample where the candidate disagreed with the oracle.
#[derive(Clone, Debug, PartialEq)]
pub struct AssertionFailure {
    /// Zero-based index of the case in the corpus.
    pub case_index: usize,
    /// Class the case was generated for, when recorded.
    pub class: Option<EquivalenceClass>,
    /// Node count of the case graph.
    pub node_count: usize,
    /// Sampled start node.
    pub start: usize,
    /// Sampled end node.
    pub end: usize,
    /// Oracle distance.
    pub expected: f64,
    /// Candidate distance.
    pub actual: f64,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "case {}", self.case_index)?;
        if let Some(class) = self.class {
            write!(f, " ({class})")?;
        }
        write!(
            f,
            ", {} nodes: distance {} -> {} expected {} but candidate returned {}",
            self.node_count, self.start, self.end, self.expected, self.actual
        )
    }
}

/// Summary of a differential run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DifferentialReport {
    cases_tested: usize,
    cases_skipped: usize,
    samples: usize,
    failures: Vec<AssertionFailure>,
}

impl DifferentialReport {
    /// Returns the number of cases sampled.
    #[must_use]
    #[rustfmt::skip]
    pub const fn cases_tested(&self) -> usize { self.cases_tested }

    /// Returns the number of cases without a usable matrix.
    #[must_use]
    #[rustfmt::skip]
    pub const fn cases_skipped(&self) -> usize { self.cases_skipped }

    /// Returns the number of pairs compared.
    #[must_use]
    #[rustfmt::skip]
    pub const fn samples(&self) -> usize { self.samples }

    /// Returns the recorded disagreements.
    #[must_use]
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    /// Returns `true` when every sample agreed with the oracle.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs candidates against a corpus.
#[derive(Clone, Copy, Debug, Default)]
pub struct DifferentialRunner {
    config: RunnerConfig,
}

impl DifferentialRunner {
    /// Creates a runner.
    #[must_use]
    pub const fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    #[rustfmt::skip]
    pub const fn config(&self) -> &RunnerConfig { &self.config }

    /// Validates `candidate` and tests it against `corpus`.
    ///
    /// # Errors
    /// Returns [`RunnerError::EmptyCorpus`] for an empty corpus,
    /// [`RunnerError::Contract`] when validation fails (before any
    /// sampling), and [`RunnerError::Assertions`] carrying the full report
    /// when any sample disagrees.
    ///
    /// # Examples
    /// ```
    /// use pathwise_core::{Corpus, DifferentialRunner, Graph, build_test_case};
    ///
    /// let graph = Graph::directed(3, [(0, 1, 2.0), (1, 2, 2.0)])?;
    /// let corpus: Corpus = [build_test_case(graph, None)].into_iter().collect();
    /// let lookup = |graph: &Graph, start: usize, end: usize| {
    ///     pathwise_core::floyd_warshall(graph)
    ///         .ok()
    ///         .and_then(|m| m.get(start, end))
    ///         .unwrap_or(f64::NAN)
    /// };
    /// let report = DifferentialRunner::default().run(&corpus, Some(&lookup))?;
    /// assert!(report.passed());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn run<C: Candidate + ?Sized>(
        &self,
        corpus: &Corpus,
        candidate: Option<&C>,
    ) -> Result<DifferentialReport, RunnerError> {
        if corpus.is_empty() {
            return Err(RunnerError::EmptyCorpus);
        }
        let validated = validate(candidate)?;
        let report = self.execute(corpus, &validated);
        if report.passed() {
            Ok(report)
        } else {
            Err(RunnerError::Assertions(report))
        }
    }

    /// Tests an already validated candidate and returns the report.
    ///
    /// Disagreements are recorded in the report rather than returned as an
    /// error.
    #[instrument(
        name = "core.differential",
        skip(self, corpus, candidate),
        fields(
            candidate = candidate.name(),
            cases = corpus.len(),
            samples = field::Empty,
            failures = field::Empty,
        ),
    )]
    pub fn execute<C: Candidate + ?Sized>(
        &self,
        corpus: &Corpus,
        candidate: &ValidatedCandidate<'_, C>,
    ) -> DifferentialReport {
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let mut report = DifferentialReport::default();

        'cases: for (case_index, case) in corpus.iter().enumerate() {
            let Some(matrix) = case.matrix() else {
                debug!(case_index, "case has no oracle matrix; skipping");
                report.cases_skipped += 1;
                continue;
            };
            let node_count = case.graph().node_count();
            if node_count == 0 {
                report.cases_skipped += 1;
                continue;
            }
            report.cases_tested += 1;
            let mut nan_reported = false;

            for _ in 0..self.config.samples_per_case.get() {
                let start = rng.gen_range(0..node_count);
                let end = rng.gen_range(0..node_count);
                let expected = matrix.get(start, end);
                let actual = candidate.distance(case.graph(), start, end);
                report.samples += 1;

                if !nan_reported && expected.is_some_and(f64::is_nan) {
                    warn!(case_index, "oracle cell is NaN; expecting NaN from the candidate");
                    nan_reported = true;
                }
                // A pair outside the matrix has no oracle value and never passes.
                if expected.is_some_and(|expected| agrees(expected, actual)) {
                    continue;
                }
                let expected = expected.unwrap_or(f64::NAN);
                let failure = failure(case_index, case, start, end, expected, actual);
                debug!(%failure, "candidate disagreed with oracle");
                report.failures.push(failure);
                if self.config.fail_fast {
                    break 'cases;
                }
            }
        }

        let span = Span::current();
        span.record("samples", report.samples);
        span.record("failures", report.failures.len());
        info!(
            tested = report.cases_tested,
            skipped = report.cases_skipped,
            passed = report.passed(),
            "differential run finished"
        );
        report
    }
}

fn agrees(expected: f64, actual: f64) -> bool {
    if expected.is_nan() {
        return actual.is_nan();
    }
    expected == actual
}

fn failure(
    case_index: usize,
    case: &TestCase,
    start: usize,
    end: usize,
    expected: f64,
    actual: f64,
) -> AssertionFailure {
    AssertionFailure {
        case_index,
        class: case.class(),
        node_count: case.graph().node_count(),
        start,
        end,
        expected,
        actual,
    }
}
