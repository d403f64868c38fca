//! Queue-based Bellman-Ford, also known as the shortest path faster algorithm.

use std::collections::VecDeque;

use pathwise_core::{Candidate, Graph};
use tracing::{instrument, trace};

use crate::{CandidateError, initial_distances};

/// Returns the distances from `start` to every node.
///
/// Only nodes whose distance just improved are queued for relaxation. Each
/// node also tracks the hop count of its current best path; a path of `n`
/// or more hops repeats a node, which can only happen through a negative
/// cycle.
///
/// # Errors
/// Returns [`CandidateError::StartOutOfRange`] for an unknown source,
/// [`CandidateError::NegativeCycle`] for a reachable negative cycle, and
/// [`CandidateError::Graph`] when an edge has no weight.
///
/// # Examples
/// ```
/// use pathwise_candidates::spfa;
/// use pathwise_core::Graph;
///
/// let graph = Graph::directed(3, [(0, 1, 4.0), (0, 2, 5.0), (2, 1, -3.0)])?;
/// assert_eq!(spfa(&graph, 0)?, vec![0.0, 2.0, 5.0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "candidates.spfa",
    level = "trace",
    err,
    skip(graph),
    fields(nodes = graph.node_count()),
)]
pub fn spfa(graph: &Graph, start: usize) -> Result<Vec<f64>, CandidateError> {
    let node_count = graph.node_count();
    let mut dist = initial_distances(graph, start)?;
    let adjacency = graph.adjacency()?;
    let mut hops = vec![0_usize; node_count];
    let mut queued = vec![false; node_count];
    let mut queue = VecDeque::from([start]);
    if let Some(flag) = queued.get_mut(start) {
        *flag = true;
    }

    let mut pops = 0_usize;
    while let Some(node) = queue.pop_front() {
        pops += 1;
        if let Some(flag) = queued.get_mut(node) {
            *flag = false;
        }
        let (Some(&base), Some(&base_hops)) = (dist.get(node), hops.get(node)) else {
            continue;
        };
        for &(neighbour, weight) in adjacency.get(node).into_iter().flatten() {
            let Some(slot) = dist.get_mut(neighbour) else {
                continue;
            };
            if base + weight >= *slot {
                continue;
            }
            *slot = base + weight;
            if base_hops + 1 >= node_count {
                return Err(CandidateError::NegativeCycle { start });
            }
            if let Some(count) = hops.get_mut(neighbour) {
                *count = base_hops + 1;
            }
            if let Some(flag) = queued.get_mut(neighbour) {
                if !*flag {
                    *flag = true;
                    queue.push_back(neighbour);
                }
            }
        }
    }
    trace!(pops, "queue drained");
    Ok(dist)
}

/// [`spfa`] as a differential-testing candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct Spfa;

impl Candidate for Spfa {
    fn name(&self) -> &str {
        "spfa"
    }

    fn distance(&self, graph: &Graph, start: usize, end: usize) -> f64 {
        crate::pick(self.name(), spfa(graph, start), end)
    }
}
