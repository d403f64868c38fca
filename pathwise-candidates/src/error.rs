//! Errors raised by the bundled candidates.

use pathwise_core::GraphError;
use thiserror::Error;

/// An error produced by a single-source run.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CandidateError {
    /// The source node does not exist.
    #[error("start node {start} is out of range for a graph with {node_count} nodes")]
    StartOutOfRange {
        /// Requested source.
        start: usize,
        /// Number of nodes in the graph.
        node_count: usize,
    },
    /// A negative cycle is reachable from the source.
    #[error("a negative cycle is reachable from node {start}")]
    NegativeCycle {
        /// Source of the run.
        start: usize,
    },
    /// The graph could not be read, usually because an edge has no weight.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

pathwise_core::define_error_codes! {
    /// Stable machine-readable codes for [`CandidateError`].
    enum CandidateErrorCode for CandidateError {
        /// See [`CandidateError::StartOutOfRange`].
        StartOutOfRange => StartOutOfRange { .. } => "CANDIDATE_START_OUT_OF_RANGE",
        /// See [`CandidateError::NegativeCycle`].
        NegativeCycle => NegativeCycle { .. } => "CANDIDATE_NEGATIVE_CYCLE",
        /// See [`CandidateError::Graph`].
        Graph => Graph(..) => "CANDIDATE_GRAPH",
    }
}
