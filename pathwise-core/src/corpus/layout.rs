//! Directory layout for generated corpora.
//!
//! Files live at `<root>/<classN>/<scale>_<classN>_test_cases<k>.json`,
//! where `k` is one more than the number of files already carrying the same
//! prefix.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::{error::CorpusError, generate::EquivalenceClass};

use super::{Corpus, save_corpus};

/// Size bucket of a corpus file, derived from its case count.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CorpusScale {
    /// At most ten cases.
    Lite,
    /// Eleven to forty-nine cases.
    Medium,
    /// Fifty cases or more.
    Large,
}

impl CorpusScale {
    /// Returns the scale for a corpus with `cases` cases.
    #[must_use]
    pub const fn for_case_count(cases: usize) -> Self {
        if cases >= 50 {
            Self::Large
        } else if cases <= 10 {
            Self::Lite
        } else {
            Self::Medium
        }
    }

    /// Returns the file-name prefix for the scale.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lite => "lite",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for CorpusScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root directory under which generated corpora are stored.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use pathwise_core::{CorpusLayout, EquivalenceClass};
///
/// let layout = CorpusLayout::new("data/sample_test_cases");
/// assert_eq!(
///     layout.class_dir(EquivalenceClass::SparseNonNegative),
///     Path::new("data/sample_test_cases/class3"),
/// );
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CorpusLayout {
    root: PathBuf,
}

impl CorpusLayout {
    /// Creates a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding corpora for `class`.
    #[must_use]
    pub fn class_dir(&self, class: EquivalenceClass) -> PathBuf {
        self.root.join(class.legacy_name())
    }

    /// Returns the path the next corpus of `cases` cases would be saved to.
    ///
    /// A missing class directory counts as empty.
    ///
    /// # Errors
    /// Returns [`CorpusError::Read`] when the class directory exists but
    /// cannot be listed.
    pub fn next_path(&self, class: EquivalenceClass, cases: usize) -> Result<PathBuf, CorpusError> {
        let directory = self.class_dir(class);
        let prefix = format!(
            "{}_{}_test_cases",
            CorpusScale::for_case_count(cases),
            class.legacy_name()
        );
        let existing = count_prefixed(&directory, &prefix).map_err(|source| CorpusError::Read {
            path: directory.clone(),
            source,
        })?;
        Ok(directory.join(format!("{prefix}{}.json", existing + 1)))
    }

    /// Saves `corpus` as the next file for `class` and returns its path.
    ///
    /// # Errors
    /// Returns [`CorpusError::Write`] when the class directory cannot be
    /// created or the file cannot be written.
    #[instrument(name = "core.corpus.store", err, skip(self, corpus), fields(cases = corpus.len()))]
    pub fn store(&self, class: EquivalenceClass, corpus: &Corpus) -> Result<PathBuf, CorpusError> {
        let directory = self.class_dir(class);
        fs::create_dir_all(&directory).map_err(|source| CorpusError::Write {
            path: directory.clone(),
            source,
        })?;
        let path = self.next_path(class, corpus.len())?;
        save_corpus(&path, corpus)?;
        Ok(path)
    }
}

fn count_prefixed(directory: &Path, prefix: &str) -> io::Result<usize> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };
    let mut count = 0;
    for entry in entries {
        if entry?.file_name().to_string_lossy().starts_with(prefix) {
            count += 1;
        }
    }
    Ok(count)
}
