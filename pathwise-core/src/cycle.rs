//! Negative-cycle detection.
//!
//! Runs Bellman-Ford from a virtual source connected to every node with a
//! zero-weight arc, so every cycle in the graph is reachable. Undirected
//! graphs take a fast path: a single negative edge already forms the
//! two-edge cycle `u -> v -> u`.

use tracing::{instrument, trace};

use crate::{Graph, error::GraphError};

/// Returns `true` when `graph` contains a cycle of negative total weight.
///
/// # Errors
/// Returns [`GraphError::MissingWeight`] when an edge has no weight.
///
/// # Examples
/// ```
/// use pathwise_core::{Graph, has_negative_cycle};
///
/// let cycle = Graph::directed(4, [(0, 1, 1.0), (1, 2, 2.0), (2, 3, 3.0), (3, 0, -9.0)])?;
/// assert!(has_negative_cycle(&cycle)?);
///
/// let fixed = Graph::directed(4, [(0, 1, 1.0), (1, 2, 2.0), (2, 3, 3.0), (3, 0, 4.0)])?;
/// assert!(!has_negative_cycle(&fixed)?);
/// # Ok::<(), pathwise_core::GraphError>(())
/// ```
#[instrument(
    name = "core.negative_cycle",
    level = "trace",
    skip(graph),
    fields(nodes = graph.node_count(), edges = graph.edge_count(), directed = graph.is_directed()),
)]
pub fn has_negative_cycle(graph: &Graph) -> Result<bool, GraphError> {
    let arcs = graph.weighted_arcs()?;
    if !graph.is_directed() && arcs.iter().any(|arc| arc.weight < 0.0) {
        trace!("negative undirected edge forms a two-edge cycle");
        return Ok(true);
    }

    let mut dist = vec![0.0_f64; graph.node_count()];
    let mut relaxed = false;
    for round in 0..graph.node_count() {
        relaxed = false;
        for arc in &arcs {
            let (Some(&from), Some(&to)) = (dist.get(arc.from), dist.get(arc.to)) else {
                continue;
            };
            let candidate = from + arc.weight;
            if candidate < to {
                if let Some(slot) = dist.get_mut(arc.to) {
                    *slot = candidate;
                }
                relaxed = true;
            }
        }
        if !relaxed {
            trace!(round, "relaxation settled");
            break;
        }
    }
    Ok(relaxed)
}
