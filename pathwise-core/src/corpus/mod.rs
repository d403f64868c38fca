//! Persistent corpora of `(graph, oracle matrix)` test cases.
//!
//! A corpus is a JSON array of cases. Cases whose graph has a missing
//! weight or a negative cycle carry a `null` matrix rather than a zero one.
//! Saving writes a temporary file next to the destination, syncs it, and
//! renames it into place.

mod format;
mod layout;

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::{
    Graph, ShortestPathMatrix, error::CorpusError, floyd_warshall, generate::EquivalenceClass,
    has_negative_cycle,
};

use self::format::CaseRecord;

pub(crate) use self::format::serialize_distance;

pub use self::layout::{CorpusLayout, CorpusScale};

/// A graph paired with its oracle matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct TestCase {
    graph: Graph,
    matrix: Option<ShortestPathMatrix>,
    class: Option<EquivalenceClass>,
}

impl TestCase {
    /// Creates a test case from its parts.
    ///
    /// # Errors
    /// Returns [`CorpusError::MatrixSize`] when the matrix does not have one
    /// row per graph node.
    pub fn new(
        graph: Graph,
        matrix: Option<ShortestPathMatrix>,
        class: Option<EquivalenceClass>,
    ) -> Result<Self, CorpusError> {
        if let Some(matrix) = &matrix {
            let nodes = graph.node_count();
            if matrix.size() != nodes {
                return Err(CorpusError::MatrixSize {
                    rows: matrix.size(),
                    nodes,
                });
            }
        }
        Ok(Self {
            graph,
            matrix,
            class,
        })
    }

    /// Returns the graph under test.
    #[must_use]
    #[rustfmt::skip]
    pub const fn graph(&self) -> &Graph { &self.graph }

    /// Returns the oracle matrix, absent for unusable graphs.
    #[must_use]
    #[rustfmt::skip]
    pub const fn matrix(&self) -> Option<&ShortestPathMatrix> { self.matrix.as_ref() }

    /// Returns the class the graph was generated for, when known.
    #[must_use]
    #[rustfmt::skip]
    pub const fn class(&self) -> Option<EquivalenceClass> { self.class }
}

/// Builds a test case, computing the oracle matrix when the graph qualifies.
///
/// The matrix is omitted when an edge lacks a weight or the graph holds a
/// negative cycle.
///
/// # Examples
/// ```
/// use pathwise_core::{Graph, build_test_case};
///
/// let good = build_test_case(Graph::directed(2, [(0, 1, 3.0)])?, None);
/// assert_eq!(good.matrix().and_then(|m| m.get(0, 1)), Some(3.0));
///
/// let cyclic = build_test_case(Graph::directed(2, [(0, 1, 1.0), (1, 0, -2.0)])?, None);
/// assert!(cyclic.matrix().is_none());
/// # Ok::<(), pathwise_core::GraphError>(())
/// ```
#[must_use]
pub fn build_test_case(graph: Graph, class: Option<EquivalenceClass>) -> TestCase {
    let matrix = match has_negative_cycle(&graph) {
        Ok(false) => floyd_warshall(&graph).ok(),
        Ok(true) | Err(_) => None,
    };
    // Floyd-Warshall always yields one row per node.
    TestCase {
        graph,
        matrix,
        class,
    }
}

/// An ordered collection of [`TestCase`] values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Corpus {
    cases: Vec<TestCase>,
}

impl Corpus {
    /// Creates a corpus from cases.
    #[must_use]
    pub const fn new(cases: Vec<TestCase>) -> Self {
        Self { cases }
    }

    /// Returns the cases in order.
    #[must_use]
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Returns the number of cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns `true` when the corpus holds no cases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Appends a case.
    pub fn push(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    /// Iterates over the cases.
    pub fn iter(&self) -> std::slice::Iter<'_, TestCase> {
        self.cases.iter()
    }
}

impl FromIterator<TestCase> for Corpus {
    fn from_iter<I: IntoIterator<Item = TestCase>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Corpus {
    type Item = TestCase;
    type IntoIter = std::vec::IntoIter<TestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.into_iter()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a TestCase;
    type IntoIter = std::slice::Iter<'a, TestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

/// Serialises a corpus to its JSON document.
///
/// # Errors
/// Returns [`CorpusError::Encode`] if serialisation fails.
pub fn encode_corpus(corpus: &Corpus) -> Result<String, CorpusError> {
    let records: Vec<CaseRecord> = corpus.iter().map(CaseRecord::from_case).collect();
    serde_json::to_string(&records).map_err(CorpusError::Encode)
}

/// Parses a corpus from its JSON document.
///
/// # Errors
/// Returns [`CorpusError::Parse`] for malformed JSON or unknown matrix
/// tokens, and [`CorpusError::Invalid`] or [`CorpusError::Graph`] for cases
/// that cannot describe a valid graph.
pub fn decode_corpus(text: &str) -> Result<Corpus, CorpusError> {
    decode_from(text, "input")
}

fn decode_from(text: &str, origin: &str) -> Result<Corpus, CorpusError> {
    let records: Vec<CaseRecord> =
        serde_json::from_str(text).map_err(|source| CorpusError::Parse {
            origin: origin.to_owned(),
            source,
        })?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_case(index))
        .collect()
}

/// Loads a corpus file.
///
/// # Errors
/// Returns [`CorpusError::Read`] when the file cannot be read and the
/// [`decode_corpus`] errors for its contents.
#[instrument(name = "core.corpus.load", err, fields(path = %path.display()))]
pub fn load_corpus(path: &Path) -> Result<Corpus, CorpusError> {
    let text = fs::read_to_string(path).map_err(|source| CorpusError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let corpus = decode_from(&text, &format!("`{}`", path.display()))?;
    debug!(cases = corpus.len(), "corpus loaded");
    Ok(corpus)
}

/// Atomically writes a corpus file.
///
/// The document is written to a temporary file in the destination
/// directory, flushed and synced, then renamed over `path`. On failure the
/// temporary file is removed and any existing file at `path` is untouched.
///
/// # Errors
/// Returns [`CorpusError::Write`] for filesystem failures and
/// [`CorpusError::Encode`] if serialisation fails.
#[instrument(
    name = "core.corpus.save",
    err,
    skip(corpus),
    fields(path = %path.display(), cases = corpus.len()),
)]
pub fn save_corpus(path: &Path, corpus: &Corpus) -> Result<(), CorpusError> {
    let text = encode_corpus(corpus)?;
    let write_error = |source: std::io::Error| CorpusError::Write {
        path: path.to_path_buf(),
        source,
    };
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut file = NamedTempFile::new_in(&directory).map_err(write_error)?;
    file.write_all(text.as_bytes()).map_err(write_error)?;
    file.flush().map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|err| write_error(err.error))?;
    info!(bytes = text.len(), "corpus written");
    Ok(())
}
