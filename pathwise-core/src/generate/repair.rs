//! Bounded weight-repair loops that steer a sample into its class.
//!
//! Each step flips one randomly chosen edge to the opposite sign, so a loop
//! runs at most once per edge of the flipped kind. The explicit step limit
//! is a second bound for pathological configurations.

use rand::{Rng, seq::SliceRandom};
use tracing::trace;

use crate::{
    Graph, has_negative_cycle,
    error::{GraphError, RepairTarget},
};

use super::class::{CycleRule, WeightRange};

/// Outcome of a repair loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum RepairOutcome {
    /// The graph now satisfies the cycle rule.
    Satisfied {
        /// Number of edges flipped.
        steps: usize,
    },
    /// No edge of the required sign remained.
    NoCandidate(RepairTarget),
    /// The step limit was reached.
    StepLimit(RepairTarget),
}

/// Flips edge weights until `graph` satisfies `rule`.
///
/// # Errors
/// Returns [`GraphError::MissingWeight`] if the detector meets an unweighted
/// edge, which generated graphs never contain.
pub(super) fn enforce_cycle_rule<R: Rng + ?Sized>(
    graph: &mut Graph,
    rule: CycleRule,
    rng: &mut R,
    max_steps: usize,
) -> Result<RepairOutcome, GraphError> {
    let (wants_cycle, target, replacement) = match rule {
        CycleRule::Ignore => return Ok(RepairOutcome::Satisfied { steps: 0 }),
        CycleRule::Exclude => (
            false,
            RepairTarget::NegativeEdge,
            WeightRange::REPAIR_NON_NEGATIVE,
        ),
        CycleRule::Require => (
            true,
            RepairTarget::NonNegativeEdge,
            WeightRange::REPAIR_NEGATIVE,
        ),
    };

    let mut steps = 0;
    while has_negative_cycle(graph)? != wants_cycle {
        if steps == max_steps {
            return Ok(RepairOutcome::StepLimit(target));
        }
        let candidates = flippable_edges(graph, target);
        let Some(&index) = candidates.choose(rng) else {
            return Ok(RepairOutcome::NoCandidate(target));
        };
        let weight = replacement.sample(rng);
        trace!(edge = index, weight, %target, "flipping edge weight");
        graph.set_weight(index, weight);
        steps += 1;
    }
    Ok(RepairOutcome::Satisfied { steps })
}

fn flippable_edges(graph: &Graph, target: RepairTarget) -> Vec<usize> {
    graph
        .edges()
        .iter()
        .enumerate()
        .filter(|(_, edge)| {
            edge.weight().is_some_and(|weight| match target {
                RepairTarget::NegativeEdge => weight < 0.0,
                RepairTarget::NonNegativeEdge => weight >= 0.0,
            })
        })
        .map(|(index, _)| index)
        .collect()
}
