//! Random edge-set sampling.
//!
//! `G(n, p)` keeps every admissible node pair independently with
//! probability `p`; `G(n, m)` draws exactly `m` distinct pairs without
//! replacement.

use rand::{Rng, seq::index};

use crate::{Graph, error::GenerationError};

/// Returns every admissible `(source, target)` pair in index order.
///
/// Directed graphs admit both orientations; undirected graphs admit
/// `source < target` only. Self-loops are never admitted.
pub(super) fn admissible_pairs(node_count: usize, directed: bool) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(Graph::max_edge_count(node_count, directed));
    for source in 0..node_count {
        let first_target = if directed { 0 } else { source + 1 };
        for target in first_target..node_count {
            if source != target {
                pairs.push((source, target));
            }
        }
    }
    pairs
}

/// Samples an Erdős–Rényi `G(n, p)` edge set.
///
/// `probability` must already be validated to lie in `(0, 1]`.
pub(super) fn gnp<R: Rng + ?Sized>(
    rng: &mut R,
    node_count: usize,
    probability: f64,
    directed: bool,
) -> Vec<(usize, usize)> {
    admissible_pairs(node_count, directed)
        .into_iter()
        .filter(|_| rng.gen_bool(probability))
        .collect()
}

/// Samples exactly `edge_count` distinct pairs.
///
/// # Errors
/// Returns [`GenerationError::EdgeCountExceedsMaximum`] when `edge_count`
/// is larger than the simple-graph maximum for the mode.
pub(super) fn gnm<R: Rng + ?Sized>(
    rng: &mut R,
    node_count: usize,
    edge_count: usize,
    directed: bool,
) -> Result<Vec<(usize, usize)>, GenerationError> {
    let maximum = Graph::max_edge_count(node_count, directed);
    if edge_count > maximum {
        return Err(GenerationError::EdgeCountExceedsMaximum {
            requested: edge_count,
            node_count,
            maximum,
        });
    }
    let pairs = admissible_pairs(node_count, directed);
    let mut picked = index::sample(rng, pairs.len(), edge_count).into_vec();
    picked.sort_unstable();
    Ok(picked
        .into_iter()
        .filter_map(|position| pairs.get(position).copied())
        .collect())
}

/// Validates an edge probability for [`gnp`].
pub(super) fn check_probability(probability: f64) -> Result<f64, GenerationError> {
    if probability > 0.0 && probability <= 1.0 {
        Ok(probability)
    } else {
        Err(GenerationError::InvalidEdgeProbability { got: probability })
    }
}

/// Draws an edge probability uniformly from `(0, 1]`.
pub(super) fn random_probability<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let drawn: f64 = rng.gen_range(0.0..1.0);
    if drawn == 0.0 { 1.0 } else { drawn }
}
