//! Error types for the pathwise core library.
//!
//! Graph construction, generation, and oracle failures are defined here
//! together with the `define_error_codes!` macro that gives every error enum
//! in the crate a stable machine-readable code.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::{contract::ValueType, generate::EquivalenceClass, runner::DifferentialReport};

/// Generates a stable code enum for an error enum.
///
/// Each entry maps a code variant to an error pattern and its string form.
/// The macro emits the code enum with `as_str` and `Display`, plus a
/// `code()` accessor on the error type.
#[doc(hidden)]
#[macro_export]
macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl ::std::fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while building or reading a [`crate::Graph`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// An edge or query referenced a node outside `0..node_count`.
    #[error("node {node} is out of range for a graph with {node_count} nodes")]
    InvalidNodeId {
        /// The offending node id.
        node: usize,
        /// Number of nodes in the graph.
        node_count: usize,
    },
    /// An edge connected a node to itself.
    #[error("edge ({node}, {node}) is a self-loop")]
    SelfLoop {
        /// The node carrying the loop.
        node: usize,
    },
    /// The same node pair appeared twice in the edge list.
    #[error("edge ({from}, {to}) appears more than once")]
    DuplicateEdge {
        /// Tail endpoint of the repeated edge.
        from: usize,
        /// Head endpoint of the repeated edge.
        to: usize,
    },
    /// An edge carried a NaN or infinite weight.
    #[error("edge ({from}, {to}) has non-finite weight {weight}")]
    NonFiniteWeight {
        /// Tail endpoint.
        from: usize,
        /// Head endpoint.
        to: usize,
        /// The rejected weight.
        weight: f64,
    },
    /// An algorithm needed the weight of an edge that has none.
    #[error("edge ({from}, {to}) has no weight attribute")]
    MissingWeight {
        /// Tail endpoint.
        from: usize,
        /// Head endpoint.
        to: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// A node id was out of range.
        InvalidNodeId => InvalidNodeId { .. } => "GRAPH_INVALID_NODE_ID",
        /// An edge connected a node to itself.
        SelfLoop => SelfLoop { .. } => "GRAPH_SELF_LOOP",
        /// The same node pair appeared twice.
        DuplicateEdge => DuplicateEdge { .. } => "GRAPH_DUPLICATE_EDGE",
        /// An edge carried a non-finite weight.
        NonFiniteWeight => NonFiniteWeight { .. } => "GRAPH_NON_FINITE_WEIGHT",
        /// An edge had no weight attribute.
        MissingWeight => MissingWeight { .. } => "GRAPH_MISSING_WEIGHT",
    }
}

/// The kind of edge a repair loop was looking for when it ran dry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RepairTarget {
    /// Removing a negative cycle needs a negative edge to flip.
    NegativeEdge,
    /// Creating a negative cycle needs a non-negative edge to flip.
    NonNegativeEdge,
}

impl fmt::Display for RepairTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NegativeEdge => "negative edge",
            Self::NonNegativeEdge => "non-negative edge",
        })
    }
}

/// Error returned by the equivalence-class generator.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GenerationError {
    /// Graphs need at least one node.
    #[error("node count must be at least 1")]
    ZeroNodes,
    /// Edge probability was NaN or outside `(0, 1]`.
    #[error("edge probability must lie in (0, 1] (got {got})")]
    InvalidEdgeProbability {
        /// The rejected probability.
        got: f64,
    },
    /// An explicit edge count exceeded what `n` nodes can hold.
    #[error("{requested} edges requested but a graph with {node_count} nodes holds at most {maximum}")]
    EdgeCountExceedsMaximum {
        /// Requested edge count.
        requested: usize,
        /// Node count of the graph.
        node_count: usize,
        /// Maximum simple-graph edge count for the mode.
        maximum: usize,
    },
    /// The class density bound cannot be met with this node count.
    #[error("class {class} cannot be generated with {node_count} nodes")]
    UnsatisfiableDensity {
        /// Requested class.
        class: EquivalenceClass,
        /// Node count that was too small.
        node_count: usize,
    },
    /// The class requires directed graphs but an undirected one was requested.
    #[error("class {class} only admits directed graphs")]
    DirectedOnly {
        /// Requested class.
        class: EquivalenceClass,
    },
    /// Repair and resampling did not reach the requested class.
    #[error(
        "could not reach class {class} within {resamples} samples ({wanted} repair did not converge)"
    )]
    Exhausted {
        /// Requested class.
        class: EquivalenceClass,
        /// Number of whole-graph samples drawn before giving up.
        resamples: usize,
        /// Edge kind the final repair loop was flipping.
        wanted: RepairTarget,
    },
    /// A generated graph could not be validated.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

define_error_codes! {
    /// Stable codes describing [`GenerationError`] variants.
    enum GenerationErrorCode for GenerationError {
        /// Graphs need at least one node.
        ZeroNodes => ZeroNodes => "GENERATION_ZERO_NODES",
        /// Edge probability outside `(0, 1]`.
        InvalidEdgeProbability => InvalidEdgeProbability { .. } => "GENERATION_INVALID_EDGE_PROBABILITY",
        /// Explicit edge count too large.
        EdgeCountExceedsMaximum => EdgeCountExceedsMaximum { .. } => "GENERATION_EDGE_COUNT_EXCEEDS_MAXIMUM",
        /// Density bound unattainable.
        UnsatisfiableDensity => UnsatisfiableDensity { .. } => "GENERATION_UNSATISFIABLE_DENSITY",
        /// Undirected graph requested for a directed-only class.
        DirectedOnly => DirectedOnly { .. } => "GENERATION_DIRECTED_ONLY",
        /// Bounded repair gave up.
        Exhausted => Exhausted { .. } => "GENERATION_EXHAUSTED",
        /// Graph validation failed.
        Graph => Graph(..) => "GENERATION_GRAPH",
    }
}

/// Error returned by the shortest-path oracle.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum OracleError {
    /// The graph contains a negative cycle, so shortest paths are undefined.
    #[error("graph contains a negative cycle; shortest paths are undefined")]
    NegativeCyclePrecondition,
    /// The graph could not be read (for example, an edge lacks a weight).
    #[error(transparent)]
    Graph(#[from] GraphError),
}

define_error_codes! {
    /// Stable codes describing [`OracleError`] variants.
    enum OracleErrorCode for OracleError {
        /// Negative cycle present.
        NegativeCyclePrecondition => NegativeCyclePrecondition => "ORACLE_NEGATIVE_CYCLE",
        /// Graph could not be read.
        Graph => Graph(..) => "ORACLE_GRAPH",
    }
}

impl OracleError {
    /// Retrieve the inner [`GraphErrorCode`] when the oracle failed on graph input.
    #[must_use]
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Graph(error) => Some(error.code()),
            Self::NegativeCyclePrecondition => None,
        }
    }
}

/// Error returned while reading or writing a test corpus.
///
/// A failed load never yields a partially populated corpus, and a failed
/// save never leaves a truncated file at the destination.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus file could not be read.
    #[error("failed to read corpus `{path}`: {source}")]
    Read {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The corpus text is not a well-formed corpus document.
    #[error("failed to parse corpus from {origin}: {source}")]
    Parse {
        /// File path or other description of the input.
        origin: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The document parsed but describes an impossible test case.
    #[error("test case {case} is invalid: {reason}")]
    Invalid {
        /// Zero-based index of the offending case.
        case: usize,
        /// Human-readable description of the problem.
        reason: String,
    },
    /// An oracle matrix does not cover every node of its graph.
    #[error("shortest-path matrix has {rows} rows but the graph has {nodes} nodes")]
    MatrixSize {
        /// Rows in the supplied matrix.
        rows: usize,
        /// Nodes in the graph.
        nodes: usize,
    },
    /// The graph of a test case failed validation.
    #[error("test case {case} holds an invalid graph: {source}")]
    Graph {
        /// Zero-based index of the offending case.
        case: usize,
        /// Validation failure.
        #[source]
        source: GraphError,
    },
    /// The corpus could not be serialised.
    #[error("failed to encode corpus: {0}")]
    Encode(#[source] serde_json::Error),
    /// The corpus file could not be written.
    #[error("failed to write corpus `{path}`: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

define_error_codes! {
    /// Stable codes describing [`CorpusError`] variants.
    enum CorpusErrorCode for CorpusError {
        /// File could not be read.
        Read => Read { .. } => "CORPUS_READ",
        /// Text could not be parsed.
        Parse => Parse { .. } => "CORPUS_PARSE",
        /// A case is structurally invalid.
        Invalid => Invalid { .. } => "CORPUS_INVALID",
        /// Matrix and graph disagree on size.
        MatrixSize => MatrixSize { .. } => "CORPUS_MATRIX_SIZE",
        /// A case graph failed validation.
        Graph => Graph { .. } => "CORPUS_GRAPH",
        /// Serialisation failed.
        Encode => Encode(..) => "CORPUS_ENCODE",
        /// File could not be written.
        Write => Write { .. } => "CORPUS_WRITE",
    }
}

/// A candidate failed the calling-contract check.
///
/// Checks run in a fixed order (presence, arity, return type, parameter
/// types) and the first failure is reported.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ContractViolation {
    /// No candidate was supplied.
    #[error("no candidate algorithm was supplied")]
    MissingCandidate,
    /// The candidate does not take exactly `(graph, start, end)`.
    #[error("candidate must accept 3 parameters (graph, start, end) but declares {found}")]
    WrongArity {
        /// Declared parameter count.
        found: usize,
    },
    /// The candidate does not return a floating-point distance.
    #[error("candidate must return a float but declares {found}")]
    WrongReturnType {
        /// Declared return type.
        found: ValueType,
    },
    /// A parameter has the wrong declared type.
    #[error("candidate parameter {position} (`{name}`) must be {expected} but declares {found}")]
    WrongParameterTypes {
        /// Zero-based parameter position.
        position: usize,
        /// Declared parameter name.
        name: String,
        /// Description of the accepted types.
        expected: &'static str,
        /// Declared type.
        found: ValueType,
    },
}

define_error_codes! {
    /// Stable codes describing [`ContractViolation`] variants.
    enum ContractViolationCode for ContractViolation {
        /// No candidate supplied.
        MissingCandidate => MissingCandidate => "CONTRACT_MISSING_CANDIDATE",
        /// Parameter count is not three.
        WrongArity => WrongArity { .. } => "CONTRACT_WRONG_ARITY",
        /// Return type is not a float.
        WrongReturnType => WrongReturnType { .. } => "CONTRACT_WRONG_RETURN_TYPE",
        /// A parameter type is wrong.
        WrongParameterTypes => WrongParameterTypes { .. } => "CONTRACT_WRONG_PARAMETER_TYPES",
    }
}

/// Error returned by the differential runner.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RunnerError {
    /// The corpus holds no test cases.
    #[error("no test cases loaded")]
    EmptyCorpus,
    /// The candidate failed contract validation; nothing was sampled.
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    /// At least one sample disagreed with the oracle.
    #[error("{} of {} samples disagreed with the oracle", .0.failures().len(), .0.samples())]
    Assertions(DifferentialReport),
}

define_error_codes! {
    /// Stable codes describing [`RunnerError`] variants.
    enum RunnerErrorCode for RunnerError {
        /// The corpus was empty.
        EmptyCorpus => EmptyCorpus => "RUNNER_EMPTY_CORPUS",
        /// Contract validation failed.
        Contract => Contract(..) => "RUNNER_CONTRACT",
        /// Samples disagreed with the oracle.
        Assertions => Assertions(..) => "RUNNER_ASSERTIONS",
    }
}
