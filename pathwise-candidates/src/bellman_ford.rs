//! Round-based Bellman-Ford.

use pathwise_core::{Candidate, Graph};
use tracing::{instrument, trace};

use crate::{CandidateError, initial_distances};

/// Returns the distances from `start` to every node.
///
/// Runs at most `n - 1` relaxation rounds over every arc and stops early
/// once a round changes nothing. A further improving arc after the last
/// round means a negative cycle is reachable from `start`.
///
/// # Errors
/// Returns [`CandidateError::StartOutOfRange`] for an unknown source,
/// [`CandidateError::NegativeCycle`] for a reachable negative cycle, and
/// [`CandidateError::Graph`] when an edge has no weight.
#[instrument(
    name = "candidates.bellman_ford",
    level = "trace",
    err,
    skip(graph),
    fields(nodes = graph.node_count()),
)]
pub fn bellman_ford(graph: &Graph, start: usize) -> Result<Vec<f64>, CandidateError> {
    let mut dist = initial_distances(graph, start)?;
    let arcs = graph.weighted_arcs()?;

    for round in 1..graph.node_count() {
        let mut changed = false;
        for arc in &arcs {
            let Some(&from) = dist.get(arc.from) else {
                continue;
            };
            if let Some(to) = dist.get_mut(arc.to) {
                if from + arc.weight < *to {
                    *to = from + arc.weight;
                    changed = true;
                }
            }
        }
        if !changed {
            trace!(round, "relaxation settled");
            return Ok(dist);
        }
    }

    let still_relaxes = arcs.iter().any(|arc| {
        match (dist.get(arc.from), dist.get(arc.to)) {
            (Some(&from), Some(&to)) => from + arc.weight < to,
            _ => false,
        }
    });
    if still_relaxes {
        return Err(CandidateError::NegativeCycle { start });
    }
    Ok(dist)
}

/// [`bellman_ford`] as a differential-testing candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct BellmanFord;

impl Candidate for BellmanFord {
    fn name(&self) -> &str {
        "bellman-ford"
    }

    fn distance(&self, graph: &Graph, start: usize, end: usize) -> f64 {
        crate::pick(self.name(), bellman_ford(graph, start), end)
    }
}
