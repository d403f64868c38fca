//! Dijkstra's algorithm with a linear scan for the closest unvisited node.
//!
//! Settled nodes are never relaxed again, so negative weights produce wrong
//! distances rather than an error. The differential runner is expected to
//! catch that on negative-weight corpora.

use pathwise_core::{Candidate, Graph};
use tracing::instrument;

use crate::{CandidateError, initial_distances};

/// Returns the distances from `start` to every node.
///
/// # Errors
/// Returns [`CandidateError::StartOutOfRange`] for an unknown source and
/// [`CandidateError::Graph`] when an edge has no weight.
///
/// # Examples
/// ```
/// use pathwise_candidates::dijkstra;
/// use pathwise_core::Graph;
///
/// let graph = Graph::directed(3, [(0, 1, 4.0), (0, 2, 1.0), (2, 1, 2.0)])?;
/// assert_eq!(dijkstra(&graph, 0)?, vec![0.0, 3.0, 1.0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "candidates.dijkstra",
    level = "trace",
    err,
    skip(graph),
    fields(nodes = graph.node_count()),
)]
pub fn dijkstra(graph: &Graph, start: usize) -> Result<Vec<f64>, CandidateError> {
    let mut dist = initial_distances(graph, start)?;
    let adjacency = graph.adjacency()?;
    let mut visited = vec![false; graph.node_count()];

    while let Some(closest) = closest_unvisited(&dist, &visited) {
        if let Some(flag) = visited.get_mut(closest) {
            *flag = true;
        }
        let Some(&base) = dist.get(closest) else {
            break;
        };
        for &(neighbour, weight) in adjacency.get(closest).into_iter().flatten() {
            if visited.get(neighbour).copied().unwrap_or(true) {
                continue;
            }
            if let Some(slot) = dist.get_mut(neighbour) {
                let candidate = base + weight;
                if candidate < *slot {
                    *slot = candidate;
                }
            }
        }
    }
    Ok(dist)
}

fn closest_unvisited(dist: &[f64], visited: &[bool]) -> Option<usize> {
    dist.iter()
        .zip(visited)
        .enumerate()
        .filter(|&(_, (&distance, &seen))| !seen && distance < f64::INFINITY)
        .min_by(|(_, (left, _)), (_, (right, _))| left.total_cmp(right))
        .map(|(node, _)| node)
}

/// [`dijkstra`] as a differential-testing candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dijkstra;

impl Candidate for Dijkstra {
    fn name(&self) -> &str {
        "dijkstra"
    }

    fn distance(&self, graph: &Graph, start: usize, end: usize) -> f64 {
        crate::pick(self.name(), dijkstra(graph, start), end)
    }
}
