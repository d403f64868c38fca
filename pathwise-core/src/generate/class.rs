//! Equivalence classes of generated test graphs.

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named category of generated graphs.
///
/// Each class fixes a weight range, a density bound, the admissible
/// directedness, and whether a negative cycle must be absent or present.
/// Membership is enforced by the generator's repair loops, not by
/// construction.
///
/// # Examples
/// ```
/// use pathwise_core::EquivalenceClass;
///
/// let class: EquivalenceClass = "sparse-non-negative".parse()?;
/// assert_eq!(class, EquivalenceClass::SparseNonNegative);
/// assert_eq!(class.legacy_name(), "class3");
/// assert_eq!("class7".parse::<EquivalenceClass>()?, EquivalenceClass::NegativeCycle);
/// # Ok::<(), pathwise_core::ParseClassError>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquivalenceClass {
    /// Weights in `[0, 100]`, any density, either directedness.
    NonNegative,
    /// Directed, weights in `[-50, 50]`, no negative cycle.
    NegativeNoCycle,
    /// Weights in `[0, 100]`, fewer than `5n` edges.
    SparseNonNegative,
    /// Directed, weights in `[0, 100]`, more than `n²/2` edges.
    DenseNonNegative,
    /// Directed, weights in `[-50, 50]`, fewer than `5n` edges, no negative cycle.
    SparseNegativeNoCycle,
    /// Directed, weights in `[-50, 50]`, more than `n²/2` edges, no negative cycle.
    DenseNegativeNoCycle,
    /// Weights in `[-50, 50]` with at least one negative cycle.
    NegativeCycle,
    /// A random draw from the other seven classes.
    Mixed,
}

/// How many edges a class admits relative to its node count.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Density {
    /// Edges are drawn independently with an edge probability.
    Unconstrained,
    /// Fewer than `5n` edges.
    Sparse,
    /// More than `n²/2` edges.
    Dense,
}

/// What a class requires of negative cycles.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CycleRule {
    /// No requirement.
    Ignore,
    /// The graph must not contain a negative cycle.
    Exclude,
    /// The graph must contain a negative cycle.
    Require,
}

/// An inclusive integer weight range.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WeightRange {
    min: i32,
    max: i32,
}

impl WeightRange {
    /// Weights used by non-negative classes.
    pub const NON_NEGATIVE: Self = Self::new(0, 100);
    /// Weights used by classes that admit negative edges.
    pub const SIGNED: Self = Self::new(-50, 50);
    /// Replacement weights when repairing away a negative cycle.
    pub const REPAIR_NON_NEGATIVE: Self = Self::new(0, 50);
    /// Replacement weights when repairing towards a negative cycle.
    pub const REPAIR_NEGATIVE: Self = Self::new(-50, -1);

    /// Creates a range; `min` and `max` are swapped when reversed.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Returns the inclusive lower bound.
    #[must_use]
    #[rustfmt::skip]
    pub const fn min(&self) -> i32 { self.min }

    /// Returns the inclusive upper bound.
    #[must_use]
    #[rustfmt::skip]
    pub const fn max(&self) -> i32 { self.max }

    /// Returns `true` when `weight` is an integer inside the range.
    #[must_use]
    pub fn contains(&self, weight: f64) -> bool {
        weight.fract() == 0.0 && weight >= f64::from(self.min) && weight <= f64::from(self.max)
    }

    /// Draws a uniform integral weight.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        f64::from(rng.gen_range(self.min..=self.max))
    }
}

impl EquivalenceClass {
    /// Every class in ordinal order.
    pub const ALL: [Self; 8] = [
        Self::NonNegative,
        Self::NegativeNoCycle,
        Self::SparseNonNegative,
        Self::DenseNonNegative,
        Self::SparseNegativeNoCycle,
        Self::DenseNegativeNoCycle,
        Self::NegativeCycle,
        Self::Mixed,
    ];

    /// Returns the stable kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NonNegative => "non-negative",
            Self::NegativeNoCycle => "negative-no-cycle",
            Self::SparseNonNegative => "sparse-non-negative",
            Self::DenseNonNegative => "dense-non-negative",
            Self::SparseNegativeNoCycle => "sparse-negative-no-cycle",
            Self::DenseNegativeNoCycle => "dense-negative-no-cycle",
            Self::NegativeCycle => "negative-cycle",
            Self::Mixed => "mixed",
        }
    }

    /// Returns the `classN` name used by corpus directory layouts.
    #[must_use]
    pub const fn legacy_name(self) -> &'static str {
        match self {
            Self::NonNegative => "class1",
            Self::NegativeNoCycle => "class2",
            Self::SparseNonNegative => "class3",
            Self::DenseNonNegative => "class4",
            Self::SparseNegativeNoCycle => "class5",
            Self::DenseNegativeNoCycle => "class6",
            Self::NegativeCycle => "class7",
            Self::Mixed => "class8",
        }
    }

    /// Returns the edge density constraint.
    #[must_use]
    pub const fn density(self) -> Density {
        match self {
            Self::SparseNonNegative | Self::SparseNegativeNoCycle => Density::Sparse,
            Self::DenseNonNegative | Self::DenseNegativeNoCycle => Density::Dense,
            Self::NonNegative | Self::NegativeNoCycle | Self::NegativeCycle | Self::Mixed => {
                Density::Unconstrained
            }
        }
    }

    /// Returns the initial weight range.
    #[must_use]
    pub const fn weights(self) -> WeightRange {
        match self {
            Self::NonNegative | Self::SparseNonNegative | Self::DenseNonNegative => {
                WeightRange::NON_NEGATIVE
            }
            Self::NegativeNoCycle
            | Self::SparseNegativeNoCycle
            | Self::DenseNegativeNoCycle
            | Self::NegativeCycle
            | Self::Mixed => WeightRange::SIGNED,
        }
    }

    /// Returns the negative-cycle requirement.
    #[must_use]
    pub const fn cycle_rule(self) -> CycleRule {
        match self {
            Self::NegativeNoCycle | Self::SparseNegativeNoCycle | Self::DenseNegativeNoCycle => {
                CycleRule::Exclude
            }
            Self::NegativeCycle => CycleRule::Require,
            Self::NonNegative
            | Self::SparseNonNegative
            | Self::DenseNonNegative
            | Self::Mixed => CycleRule::Ignore,
        }
    }

    /// Returns `true` when the class only admits directed graphs.
    ///
    /// Negative-capable acyclic classes are directed because any negative
    /// undirected edge is itself a negative cycle. Dense classes are directed
    /// because an undirected simple graph never exceeds `n²/2` edges.
    #[must_use]
    pub const fn directed_only(self) -> bool {
        matches!(self.cycle_rule(), CycleRule::Exclude) || matches!(self.density(), Density::Dense)
    }

    /// Returns `false` only for [`EquivalenceClass::Mixed`].
    #[must_use]
    pub const fn is_concrete(self) -> bool {
        !matches!(self, Self::Mixed)
    }

    /// Returns the smallest node count the class can be generated with.
    #[must_use]
    pub const fn min_node_count(self) -> usize {
        match (self.density(), self.cycle_rule()) {
            (Density::Dense, _) => 3,
            (_, CycleRule::Require) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for EquivalenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown class name.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown equivalence class `{provided}`")]
pub struct ParseClassError {
    /// The rejected input.
    pub provided: String,
}

impl FromStr for EquivalenceClass {
    type Err = ParseClassError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == normalized || class.legacy_name() == normalized)
            .ok_or_else(|| ParseClassError {
                provided: raw.to_owned(),
            })
    }
}
