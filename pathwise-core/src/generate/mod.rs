//! Equivalence-class graph generation.
//!
//! [`GraphGenerator`] draws a topology and weights for the requested
//! [`EquivalenceClass`], then runs a bounded repair loop that flips edge
//! weights until the negative-cycle rule of the class holds. When a repair
//! runs out of flippable edges (for example, asking for a negative cycle in
//! a directed acyclic sample) the whole sample is redrawn, up to
//! [`GeneratorConfig::max_resamples`] times.

mod class;
mod repair;
mod topology;

use std::num::NonZeroUsize;

use rand::{Rng, SeedableRng, rngs::SmallRng, seq::SliceRandom};
use tracing::{Span, debug, field, instrument};

use crate::{
    Edge, Graph,
    error::{GenerationError, RepairTarget},
};

pub use self::class::{CycleRule, Density, EquivalenceClass, ParseClassError, WeightRange};

use self::repair::{RepairOutcome, enforce_cycle_rule};

const DEFAULT_MAX_REPAIR_STEPS: usize = 4_096;
const DEFAULT_MAX_RESAMPLES: usize = 32;
const BATCH_NODE_RANGE: (usize, usize) = (5, 30);
const BATCH_DENSE_NODE_RANGE: (usize, usize) = (5, 20);
const MIXED_BATCH_POOL: [EquivalenceClass; 4] = [
    EquivalenceClass::SparseNonNegative,
    EquivalenceClass::DenseNonNegative,
    EquivalenceClass::SparseNegativeNoCycle,
    EquivalenceClass::DenseNegativeNoCycle,
];

/// Seed and retry bounds for a [`GraphGenerator`].
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use pathwise_core::GeneratorConfig;
///
/// let config = GeneratorConfig::new(7)
///     .with_max_repair_steps(128)
///     .with_max_resamples(NonZeroUsize::new(4).expect("non-zero"));
/// assert_eq!(config.seed(), 7);
/// assert_eq!(config.max_repair_steps(), 128);
/// assert_eq!(config.max_resamples().get(), 4);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GeneratorConfig {
    seed: u64,
    max_repair_steps: usize,
    max_resamples: NonZeroUsize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GeneratorConfig {
    /// Creates a configuration with default bounds.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            max_repair_steps: DEFAULT_MAX_REPAIR_STEPS,
            max_resamples: match NonZeroUsize::new(DEFAULT_MAX_RESAMPLES) {
                Some(value) => value,
                None => NonZeroUsize::MIN,
            },
        }
    }

    /// Overrides the number of weight flips allowed per sample.
    #[must_use]
    pub const fn with_max_repair_steps(mut self, steps: usize) -> Self {
        self.max_repair_steps = steps;
        self
    }

    /// Overrides the number of whole-graph samples allowed per request.
    #[must_use]
    pub const fn with_max_resamples(mut self, resamples: NonZeroUsize) -> Self {
        self.max_resamples = resamples;
        self
    }

    /// Returns the RNG seed.
    #[must_use]
    #[rustfmt::skip]
    pub const fn seed(&self) -> u64 { self.seed }

    /// Returns the per-sample repair step limit.
    #[must_use]
    #[rustfmt::skip]
    pub const fn max_repair_steps(&self) -> usize { self.max_repair_steps }

    /// Returns the per-request sample limit.
    #[must_use]
    #[rustfmt::skip]
    pub const fn max_resamples(&self) -> NonZeroUsize { self.max_resamples }
}

/// Shape parameters for a single generated graph.
///
/// Unset fields are drawn at random: the edge probability uniformly from
/// `(0, 1]` and the directedness by a fair coin (directed-only classes
/// always produce directed graphs).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphRequest {
    node_count: usize,
    edge_probability: Option<f64>,
    directed: Option<bool>,
}

impl GraphRequest {
    /// Creates a request for `node_count` nodes.
    #[must_use]
    pub const fn new(node_count: usize) -> Self {
        Self {
            node_count,
            edge_probability: None,
            directed: None,
        }
    }

    /// Fixes the edge probability used by density-unconstrained classes.
    #[must_use]
    pub const fn with_edge_probability(mut self, probability: f64) -> Self {
        self.edge_probability = Some(probability);
        self
    }

    /// Fixes the directedness.
    #[must_use]
    pub const fn with_directed(mut self, directed: bool) -> Self {
        self.directed = Some(directed);
        self
    }

    /// Returns the requested node count.
    #[must_use]
    #[rustfmt::skip]
    pub const fn node_count(&self) -> usize { self.node_count }
}

/// A generated graph together with the concrete class it satisfies.
///
/// For [`EquivalenceClass::Mixed`] requests `class` holds the class that was
/// actually drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedGraph {
    /// The concrete class the graph was generated for.
    pub class: EquivalenceClass,
    /// The generated graph.
    pub graph: Graph,
}

/// Seeded generator of equivalence-class graphs.
///
/// # Examples
/// ```
/// use pathwise_core::{EquivalenceClass, GeneratorConfig, GraphGenerator, GraphRequest};
/// use pathwise_core::has_negative_cycle;
///
/// let mut generator = GraphGenerator::new(GeneratorConfig::new(42));
/// let generated = generator
///     .generate(EquivalenceClass::NegativeNoCycle, GraphRequest::new(12))
///     .expect("generation must succeed");
/// assert!(generated.graph.is_directed());
/// assert!(!has_negative_cycle(&generated.graph).expect("weights present"));
/// ```
#[derive(Clone, Debug)]
pub struct GraphGenerator {
    config: GeneratorConfig,
    rng: SmallRng,
}

impl GraphGenerator {
    /// Creates a generator seeded from `config`.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates one graph of `class`.
    ///
    /// # Errors
    /// Returns [`GenerationError::ZeroNodes`],
    /// [`GenerationError::InvalidEdgeProbability`],
    /// [`GenerationError::DirectedOnly`], or
    /// [`GenerationError::UnsatisfiableDensity`] for unusable requests, and
    /// [`GenerationError::Exhausted`] when the repair bounds are hit.
    #[instrument(
        name = "core.generate",
        err,
        skip(self, request),
        fields(nodes = request.node_count, resolved = field::Empty, edges = field::Empty),
    )]
    pub fn generate(
        &mut self,
        class: EquivalenceClass,
        request: GraphRequest,
    ) -> Result<GeneratedGraph, GenerationError> {
        let concrete = self.resolve_class(class, request)?;
        let span = Span::current();
        span.record("resolved", field::display(concrete));

        let mut wanted = RepairTarget::NegativeEdge;
        for sample in 1..=self.config.max_resamples.get() {
            let mut graph = self.sample(concrete, request)?;
            match enforce_cycle_rule(
                &mut graph,
                concrete.cycle_rule(),
                &mut self.rng,
                self.config.max_repair_steps,
            )? {
                RepairOutcome::Satisfied { steps } => {
                    span.record("edges", graph.edge_count());
                    debug!(sample, repair_steps = steps, "graph generated");
                    return Ok(GeneratedGraph {
                        class: concrete,
                        graph,
                    });
                }
                RepairOutcome::NoCandidate(target) | RepairOutcome::StepLimit(target) => {
                    debug!(sample, %target, "repair did not converge; resampling");
                    wanted = target;
                }
            }
        }

        Err(GenerationError::Exhausted {
            class: concrete,
            resamples: self.config.max_resamples.get(),
            wanted,
        })
    }

    /// Generates a graph with exactly `edge_count` edges and weights drawn
    /// from `weights`.
    ///
    /// # Errors
    /// Returns [`GenerationError::EdgeCountExceedsMaximum`] when the count is
    /// larger than a simple graph with `node_count` nodes can hold; the count
    /// is never clamped.
    pub fn graph_with_edge_count(
        &mut self,
        node_count: usize,
        edge_count: usize,
        directed: bool,
        weights: WeightRange,
    ) -> Result<Graph, GenerationError> {
        let pairs = topology::gnm(&mut self.rng, node_count, edge_count, directed)?;
        self.weigh(node_count, directed, pairs, weights)
    }

    /// Generates `count` graphs of `class` with randomised shapes.
    ///
    /// Node counts are drawn from `5..=30` (`5..=20` for dense classes).
    /// [`EquivalenceClass::Mixed`] batches contain `max(count / 10, 1)`
    /// negative-cycle graphs, the rest drawn from the sparse and dense
    /// classes.
    ///
    /// # Errors
    /// Propagates the first [`GenerationError`].
    #[instrument(name = "core.generate_batch", err, skip(self))]
    pub fn generate_batch(
        &mut self,
        class: EquivalenceClass,
        count: usize,
    ) -> Result<Vec<GeneratedGraph>, GenerationError> {
        let plan = if class.is_concrete() {
            vec![class; count]
        } else {
            self.mixed_plan(count)
        };

        plan.into_iter()
            .map(|planned| {
                let (low, high) = match planned.density() {
                    Density::Dense => BATCH_DENSE_NODE_RANGE,
                    Density::Sparse | Density::Unconstrained => BATCH_NODE_RANGE,
                };
                let nodes = self.rng.gen_range(low..=high);
                self.generate(planned, GraphRequest::new(nodes))
            })
            .collect()
    }

    fn mixed_plan(&mut self, count: usize) -> Vec<EquivalenceClass> {
        let cycles = (count / 10).max(1).min(count);
        let mut plan = vec![EquivalenceClass::NegativeCycle; cycles];
        for _ in cycles..count {
            if let Some(&class) = MIXED_BATCH_POOL.choose(&mut self.rng) {
                plan.push(class);
            }
        }
        plan
    }

    fn resolve_class(
        &mut self,
        class: EquivalenceClass,
        request: GraphRequest,
    ) -> Result<EquivalenceClass, GenerationError> {
        if request.node_count == 0 {
            return Err(GenerationError::ZeroNodes);
        }
        if let Some(probability) = request.edge_probability {
            topology::check_probability(probability)?;
        }
        if class.is_concrete() {
            if request.directed == Some(false) && class.directed_only() {
                return Err(GenerationError::DirectedOnly { class });
            }
            if request.node_count < class.min_node_count() {
                return Err(GenerationError::UnsatisfiableDensity {
                    class,
                    node_count: request.node_count,
                });
            }
            return Ok(class);
        }

        let admissible: Vec<EquivalenceClass> = EquivalenceClass::ALL
            .into_iter()
            .filter(|candidate| candidate.is_concrete())
            .filter(|candidate| request.directed != Some(false) || !candidate.directed_only())
            .filter(|candidate| request.node_count >= candidate.min_node_count())
            .collect();
        admissible
            .choose(&mut self.rng)
            .copied()
            .ok_or(GenerationError::UnsatisfiableDensity {
                class,
                node_count: request.node_count,
            })
    }

    fn sample(
        &mut self,
        class: EquivalenceClass,
        request: GraphRequest,
    ) -> Result<Graph, GenerationError> {
        let nodes = request.node_count;
        let directed = if class.directed_only() {
            true
        } else {
            request.directed.unwrap_or_else(|| self.rng.gen_bool(0.5))
        };

        let pairs = match class.density() {
            Density::Unconstrained => {
                let probability = request
                    .edge_probability
                    .unwrap_or_else(|| topology::random_probability(&mut self.rng));
                topology::gnp(&mut self.rng, nodes, probability, directed)
            }
            Density::Sparse | Density::Dense => {
                let (low, high) = edge_count_bounds(class, nodes, directed)?;
                let edge_count = self.rng.gen_range(low..=high);
                topology::gnm(&mut self.rng, nodes, edge_count, directed)?
            }
        };
        self.weigh(nodes, directed, pairs, class.weights())
    }

    fn weigh(
        &mut self,
        node_count: usize,
        directed: bool,
        pairs: Vec<(usize, usize)>,
        weights: WeightRange,
    ) -> Result<Graph, GenerationError> {
        let edges = pairs
            .into_iter()
            .map(|(source, target)| Edge::new(source, target, weights.sample(&mut self.rng)))
            .collect();
        Ok(Graph::new(node_count, directed, edges)?)
    }
}

/// Returns the inclusive edge-count range for a density-bounded class.
///
/// Sparse graphs draw from `[ceil(n/2), min(3n, max)]`, which stays below
/// `5n`. Dense graphs draw from `[floor(n²/2) + 1, max]`.
fn edge_count_bounds(
    class: EquivalenceClass,
    node_count: usize,
    directed: bool,
) -> Result<(usize, usize), GenerationError> {
    let maximum = Graph::max_edge_count(node_count, directed);
    let (low, high) = match class.density() {
        Density::Sparse => {
            let high = node_count.saturating_mul(3).min(maximum);
            (node_count.div_ceil(2).min(high), high)
        }
        Density::Dense => (node_count.saturating_mul(node_count) / 2 + 1, maximum),
        Density::Unconstrained => (0, maximum),
    };
    if low > high {
        return Err(GenerationError::UnsatisfiableDensity { class, node_count });
    }
    Ok((low, high))
}
