//! Pathwise core library.
//!
//! Generates graphs for named equivalence classes, computes a trusted
//! Floyd-Warshall oracle for them, persists `(graph, matrix)` corpora, and
//! runs candidate single-pair shortest-path algorithms against those
//! corpora.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod contract;
pub mod corpus;
mod cycle;
pub mod error;
pub mod generate;
mod graph;
mod oracle;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    contract::{Candidate, CandidateSignature, Parameter, ValidatedCandidate, ValueType},
    corpus::{
        Corpus, CorpusLayout, CorpusScale, TestCase, build_test_case, decode_corpus,
        encode_corpus, load_corpus, save_corpus,
    },
    cycle::has_negative_cycle,
    error::{
        ContractViolation, ContractViolationCode, CorpusError, CorpusErrorCode, GenerationError,
        GenerationErrorCode, GraphError, GraphErrorCode, OracleError, OracleErrorCode,
        RepairTarget, RunnerError, RunnerErrorCode,
    },
    generate::{
        CycleRule, Density, EquivalenceClass, GeneratedGraph, GeneratorConfig, GraphGenerator,
        GraphRequest, ParseClassError, WeightRange,
    },
    graph::{Edge, Graph, WeightedArc},
    oracle::{
        PathHop, PathResult, ShortestPathMatrix, ShortestPaths, floyd_warshall,
        floyd_warshall_checked, floyd_warshall_with_paths, floyd_warshall_with_paths_checked,
    },
    runner::{AssertionFailure, DifferentialReport, DifferentialRunner, RunnerConfig},
};
