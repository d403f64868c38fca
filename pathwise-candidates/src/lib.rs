//! Single-pair shortest-path candidates for pathwise differential runs.
//!
//! Each algorithm exposes a single-source function returning the distance
//! from `start` to every node, and a unit struct implementing
//! [`pathwise_core::Candidate`] so it can be handed straight to the
//! differential runner. [`Algorithm`] names them for command-line selection.

mod bellman_ford;
mod dijkstra;
mod error;
mod spfa;

use std::{fmt, str::FromStr};

use pathwise_core::{Candidate, CycleRule, EquivalenceClass, Graph};
use thiserror::Error;
use tracing::warn;

pub use crate::{
    bellman_ford::{BellmanFord, bellman_ford},
    dijkstra::{Dijkstra, dijkstra},
    error::{CandidateError, CandidateErrorCode},
    spfa::{Spfa, spfa},
};

/// Names of the bundled algorithms.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Algorithm {
    /// Array-scan Dijkstra; assumes non-negative weights.
    Dijkstra,
    /// Round-based Bellman-Ford relaxation.
    BellmanFord,
    /// Queue-based Bellman-Ford (shortest path faster algorithm).
    Spfa,
}

impl Algorithm {
    /// Every bundled algorithm.
    pub const ALL: [Self; 3] = [Self::Dijkstra, Self::BellmanFord, Self::Spfa];

    /// Returns the stable kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dijkstra => "dijkstra",
            Self::BellmanFord => "bellman-ford",
            Self::Spfa => "spfa",
        }
    }

    /// Returns `true` when the algorithm is exact on every graph of `class`.
    ///
    /// Negative-cycle graphs carry no oracle matrix and are skipped by the
    /// runner, so they do not count against the relaxation algorithms.
    ///
    /// # Examples
    /// ```
    /// use pathwise_candidates::Algorithm;
    /// use pathwise_core::EquivalenceClass;
    ///
    /// assert!(Algorithm::Spfa.handles(EquivalenceClass::NegativeNoCycle));
    /// assert!(!Algorithm::Dijkstra.handles(EquivalenceClass::NegativeNoCycle));
    /// ```
    #[must_use]
    pub const fn handles(self, class: EquivalenceClass) -> bool {
        match self {
            Self::Dijkstra => {
                class.weights().min() >= 0 && !matches!(class.cycle_rule(), CycleRule::Require)
            }
            Self::BellmanFord | Self::Spfa => true,
        }
    }

    /// Returns the distances from `start` to every node.
    ///
    /// # Errors
    /// Propagates the [`CandidateError`] of the selected algorithm.
    pub fn single_source(self, graph: &Graph, start: usize) -> Result<Vec<f64>, CandidateError> {
        match self {
            Self::Dijkstra => dijkstra(graph, start),
            Self::BellmanFord => bellman_ford(graph, start),
            Self::Spfa => spfa(graph, start),
        }
    }

    /// Returns the algorithm as a boxed candidate.
    #[must_use]
    pub fn candidate(self) -> Box<dyn Candidate + Send + Sync> {
        match self {
            Self::Dijkstra => Box::new(Dijkstra),
            Self::BellmanFord => Box::new(BellmanFord),
            Self::Spfa => Box::new(Spfa),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown algorithm name.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown algorithm `{provided}`; expected dijkstra, bellman-ford, or spfa")]
pub struct ParseAlgorithmError {
    provided: String,
}

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalised = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == normalised)
            .ok_or(ParseAlgorithmError {
                provided: raw.to_owned(),
            })
    }
}

/// Returns an all-unreachable distance vector with `start` at zero.
fn initial_distances(graph: &Graph, start: usize) -> Result<Vec<f64>, CandidateError> {
    let node_count = graph.node_count();
    let mut dist = vec![f64::INFINITY; node_count];
    let Some(origin) = dist.get_mut(start) else {
        return Err(CandidateError::StartOutOfRange { start, node_count });
    };
    *origin = 0.0;
    Ok(dist)
}

/// Picks `end` out of a single-source result for [`Candidate::distance`].
///
/// Failures surface as NaN, which the runner always reports as a
/// disagreement against a finite oracle cell.
fn pick(name: &str, distances: Result<Vec<f64>, CandidateError>, end: usize) -> f64 {
    match distances {
        Ok(distances) => distances.get(end).copied().unwrap_or(f64::NAN),
        Err(err) => {
            warn!(candidate = name, code = %err.code(), error = %err, "candidate failed");
            f64::NAN
        }
    }
}
