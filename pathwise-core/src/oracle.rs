//! Floyd-Warshall all-pairs shortest-path oracle.
//!
//! The oracle is the trusted reference every candidate is compared against.
//! It is deliberately the textbook cubic algorithm: `dist[i][i] = 0`, direct
//! edges seed the matrix, and for `k`, `i`, `j` in index order a cell is
//! replaced only on strict improvement.
//!
//! Results are undefined when the graph holds a negative cycle. The
//! `*_checked` entry points run [`has_negative_cycle`] first and return
//! [`OracleError::NegativeCyclePrecondition`] instead.

use serde::Serialize;
use tracing::{Span, field, instrument};

use crate::{
    Graph,
    corpus::serialize_distance,
    has_negative_cycle,
    error::{GraphError, OracleError},
};

/// An immutable `n × n` matrix of shortest-path distances.
///
/// The diagonal is `0`, unreachable pairs hold `+inf`.
///
/// # Examples
/// ```
/// use pathwise_core::{Graph, floyd_warshall};
///
/// let graph = Graph::directed(3, [(0, 1, 4.0), (1, 2, -1.0), (0, 2, 5.0)])?;
/// let matrix = floyd_warshall(&graph)?;
/// assert_eq!(matrix.get(0, 2), Some(3.0));
/// assert_eq!(matrix.get(2, 0), Some(f64::INFINITY));
/// # Ok::<(), pathwise_core::GraphError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ShortestPathMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl ShortestPathMatrix {
    fn unreachable(size: usize) -> Self {
        let mut cells = vec![f64::INFINITY; size * size];
        for node in 0..size {
            if let Some(cell) = cells.get_mut(node * size + node) {
                *cell = 0.0;
            }
        }
        Self { size, cells }
    }

    /// Builds a matrix from row vectors.
    ///
    /// Returns `None` unless every row has exactly `rows.len()` cells.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(Self {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Returns the number of rows (and columns).
    #[must_use]
    #[rustfmt::skip]
    pub const fn size(&self) -> usize { self.size }

    /// Returns the distance from `source` to `target`.
    #[must_use]
    pub fn get(&self, source: usize, target: usize) -> Option<f64> {
        if source >= self.size || target >= self.size {
            return None;
        }
        self.cells.get(source * self.size + target).copied()
    }

    /// Returns the distances from `source` to every node.
    #[must_use]
    pub fn row(&self, source: usize) -> Option<&[f64]> {
        if source >= self.size {
            return None;
        }
        self.cells
            .get(source * self.size..(source + 1) * self.size)
    }

    /// Iterates over the rows in node order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.cells.chunks(self.size.max(1)).take(self.size)
    }

    /// Returns `true` when `m[i][j] == m[j][i]` for every pair.
    ///
    /// Infinite cells compare equal to each other; NaN never does.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (i + 1..self.size).all(|j| self.get(i, j) == self.get(j, i)))
    }

    fn cell_mut(&mut self, source: usize, target: usize) -> Option<&mut f64> {
        self.cells.get_mut(source * self.size + target)
    }
}

/// One traversed edge of a reconstructed path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PathHop {
    /// Node the hop leaves.
    pub from: usize,
    /// Node the hop enters.
    pub to: usize,
    /// Weight of the traversed edge.
    #[serde(serialize_with = "serialize_distance")]
    pub weight: f64,
}

/// A reconstructed shortest path.
///
/// Unreachable targets yield no hops and an infinite distance; a path from a
/// node to itself yields no hops and distance `0`. Serialised distances use
/// the corpus tokens (`"inf"`, `"-inf"`, `"nan"`) for non-finite values.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PathResult {
    /// The hops in travel order.
    pub hops: Vec<PathHop>,
    /// Total distance, equal to the matrix cell for the pair.
    #[serde(serialize_with = "serialize_distance")]
    pub distance: f64,
}

impl PathResult {
    /// Returns `true` when the target could be reached.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }

    /// Returns the visited nodes, starting at the source.
    #[must_use]
    pub fn nodes(&self) -> Vec<usize> {
        let mut nodes: Vec<usize> = self.hops.first().map(|hop| hop.from).into_iter().collect();
        nodes.extend(self.hops.iter().map(|hop| hop.to));
        nodes
    }
}

/// Distances plus next-hop tracking for path reconstruction.
#[derive(Clone, Debug, PartialEq)]
pub struct ShortestPaths {
    matrix: ShortestPathMatrix,
    next: Vec<Option<usize>>,
    direct: ShortestPathMatrix,
}

impl ShortestPaths {
    /// Returns the distance matrix.
    #[must_use]
    #[rustfmt::skip]
    pub const fn matrix(&self) -> &ShortestPathMatrix { &self.matrix }

    /// Consumes the paths and returns the distance matrix.
    #[must_use]
    pub fn into_matrix(self) -> ShortestPathMatrix {
        self.matrix
    }

    /// Reconstructs the shortest path from `start` to `end`.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidNodeId`] (wrapped) for unknown nodes and
    /// [`OracleError::NegativeCyclePrecondition`] when the next-hop walk does
    /// not terminate within `n` hops.
    ///
    /// # Examples
    /// ```
    /// use pathwise_core::{Graph, floyd_warshall_with_paths};
    ///
    /// let graph = Graph::undirected(4, [(0, 1, 1.0), (1, 2, 2.0), (0, 2, 9.0)])?;
    /// let paths = floyd_warshall_with_paths(&graph)?;
    /// let path = paths.path(0, 2)?;
    /// assert_eq!(path.nodes(), vec![0, 1, 2]);
    /// assert_eq!(path.distance, 3.0);
    /// assert!(!paths.path(0, 3)?.is_reachable());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn path(&self, start: usize, end: usize) -> Result<PathResult, OracleError> {
        let size = self.matrix.size();
        for node in [start, end] {
            if node >= size {
                return Err(GraphError::InvalidNodeId {
                    node,
                    node_count: size,
                }
                .into());
            }
        }
        let distance = self.matrix.get(start, end).unwrap_or(f64::INFINITY);
        if start == end {
            return Ok(PathResult {
                hops: Vec::new(),
                distance: 0.0,
            });
        }

        let mut hops = Vec::new();
        let mut current = start;
        while current != end {
            let Some(hop) = self.next_hop(current, end) else {
                return Ok(PathResult {
                    hops: Vec::new(),
                    distance: f64::INFINITY,
                });
            };
            if hops.len() == size {
                return Err(OracleError::NegativeCyclePrecondition);
            }
            hops.push(PathHop {
                from: current,
                to: hop,
                weight: self.direct.get(current, hop).unwrap_or(f64::INFINITY),
            });
            current = hop;
        }
        Ok(PathResult { hops, distance })
    }

    fn next_hop(&self, source: usize, target: usize) -> Option<usize> {
        self.next
            .get(source * self.matrix.size() + target)
            .copied()
            .flatten()
    }
}

/// Computes all-pairs shortest paths.
///
/// # Errors
/// Returns [`GraphError::MissingWeight`] when an edge has no weight.
pub fn floyd_warshall(graph: &Graph) -> Result<ShortestPathMatrix, GraphError> {
    Ok(relax_all_pairs(graph)?.matrix)
}

/// Computes all-pairs shortest paths after ruling out negative cycles.
///
/// # Errors
/// Returns [`OracleError::NegativeCyclePrecondition`] when the graph holds a
/// negative cycle and [`OracleError::Graph`] when it cannot be read.
pub fn floyd_warshall_checked(graph: &Graph) -> Result<ShortestPathMatrix, OracleError> {
    ensure_no_negative_cycle(graph)?;
    Ok(floyd_warshall(graph)?)
}

/// Computes all-pairs shortest paths with next-hop tracking.
///
/// # Errors
/// Returns [`GraphError::MissingWeight`] when an edge has no weight.
pub fn floyd_warshall_with_paths(graph: &Graph) -> Result<ShortestPaths, GraphError> {
    relax_all_pairs(graph)
}

/// Checked variant of [`floyd_warshall_with_paths`].
///
/// # Errors
/// Returns [`OracleError::NegativeCyclePrecondition`] when the graph holds a
/// negative cycle and [`OracleError::Graph`] when it cannot be read.
pub fn floyd_warshall_with_paths_checked(graph: &Graph) -> Result<ShortestPaths, OracleError> {
    ensure_no_negative_cycle(graph)?;
    Ok(relax_all_pairs(graph)?)
}

fn ensure_no_negative_cycle(graph: &Graph) -> Result<(), OracleError> {
    if has_negative_cycle(graph)? {
        return Err(OracleError::NegativeCyclePrecondition);
    }
    Ok(())
}

#[instrument(
    name = "core.oracle",
    level = "debug",
    err,
    skip(graph),
    fields(nodes = graph.node_count(), edges = graph.edge_count(), improvements = field::Empty),
)]
fn relax_all_pairs(graph: &Graph) -> Result<ShortestPaths, GraphError> {
    let size = graph.node_count();
    let mut matrix = ShortestPathMatrix::unreachable(size);
    let mut direct = ShortestPathMatrix::unreachable(size);
    let mut next: Vec<Option<usize>> = vec![None; size * size];

    for arc in graph.weighted_arcs()? {
        let index = arc.from * size + arc.to;
        if let Some(cell) = matrix.cell_mut(arc.from, arc.to) {
            *cell = arc.weight;
        }
        if let Some(cell) = direct.cell_mut(arc.from, arc.to) {
            *cell = arc.weight;
        }
        if let Some(slot) = next.get_mut(index) {
            *slot = Some(arc.to);
        }
    }

    let mut improvements = 0_usize;
    for k in 0..size {
        for i in 0..size {
            let Some(through_k) = matrix.get(i, k) else {
                continue;
            };
            if through_k == f64::INFINITY {
                continue;
            }
            let first_hop = next.get(i * size + k).copied().flatten();
            for j in 0..size {
                let (Some(tail), Some(current)) = (matrix.get(k, j), matrix.get(i, j)) else {
                    continue;
                };
                let candidate = through_k + tail;
                if candidate < current {
                    if let Some(cell) = matrix.cell_mut(i, j) {
                        *cell = candidate;
                    }
                    if let Some(slot) = next.get_mut(i * size + j) {
                        *slot = first_hop;
                    }
                    improvements += 1;
                }
            }
        }
    }
    Span::current().record("improvements", improvements);

    Ok(ShortestPaths {
        matrix,
        next,
        direct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rstest::rstest;

    use crate::{
        EquivalenceClass, GeneratorConfig, GraphGenerator, GraphRequest,
        test_utils::suite_proptest_config,
    };

    fn diamond() -> Graph {
        Graph::directed(
            4,
            [(0, 1, 1.0), (0, 2, 4.0), (1, 2, 2.0), (1, 3, 6.0), (2, 3, 1.0)],
        )
        .expect("diamond must build")
    }

    #[test]
    fn computes_directed_distances() {
        let matrix = floyd_warshall(&diamond()).expect("weights present");
        let expected = [
            [0.0, 1.0, 3.0, 4.0],
            [f64::INFINITY, 0.0, 2.0, 3.0],
            [f64::INFINITY, f64::INFINITY, 0.0, 1.0],
            [f64::INFINITY, f64::INFINITY, f64::INFINITY, 0.0],
        ];
        for (i, row) in expected.iter().enumerate() {
            assert_eq!(matrix.row(i), Some(row.as_slice()));
        }
    }

    #[test]
    fn undirected_distances_are_symmetric() {
        let graph = Graph::undirected(4, [(0, 1, 3.0), (1, 2, 1.0), (2, 3, 7.0), (0, 3, 2.0)])
            .expect("graph must build");
        let matrix = floyd_warshall(&graph).expect("weights present");
        assert!(matrix.is_symmetric());
        assert_eq!(matrix.get(1, 3), Some(5.0));
    }

    #[test]
    fn negative_edges_without_cycles_are_handled() {
        let graph = Graph::directed(3, [(0, 1, 5.0), (1, 2, -3.0), (0, 2, 4.0)])
            .expect("graph must build");
        let matrix = floyd_warshall_checked(&graph).expect("no negative cycle");
        assert_eq!(matrix.get(0, 2), Some(2.0));
    }

    #[test]
    fn checked_oracle_rejects_negative_cycles() {
        let graph = Graph::directed(3, [(0, 1, 1.0), (1, 2, -4.0), (2, 0, 1.0)])
            .expect("graph must build");
        assert_eq!(
            floyd_warshall_checked(&graph),
            Err(OracleError::NegativeCyclePrecondition)
        );
        assert!(matches!(
            floyd_warshall_with_paths_checked(&graph),
            Err(OracleError::NegativeCyclePrecondition)
        ));
    }

    #[test]
    fn missing_weight_is_an_error() {
        let graph = Graph::new(2, true, vec![crate::Edge::unweighted(0, 1)])
            .expect("graph must build");
        assert_eq!(
            floyd_warshall(&graph),
            Err(GraphError::MissingWeight { from: 0, to: 1 })
        );
    }

    #[test]
    fn reconstructs_paths_with_hop_weights() {
        let paths = floyd_warshall_with_paths(&diamond()).expect("weights present");
        let path = paths.path(0, 3).expect("nodes in range");
        assert_eq!(
            path.hops,
            vec![
                PathHop { from: 0, to: 1, weight: 1.0 },
                PathHop { from: 1, to: 2, weight: 2.0 },
                PathHop { from: 2, to: 3, weight: 1.0 },
            ]
        );
        assert_eq!(path.distance, 4.0);
        let total: f64 = path.hops.iter().map(|hop| hop.weight).sum();
        assert_eq!(total, path.distance);
    }

    #[rstest]
    #[case::unreachable(3, 0, f64::INFINITY)]
    #[case::same_node(2, 2, 0.0)]
    fn degenerate_paths_have_no_hops(
        #[case] start: usize,
        #[case] end: usize,
        #[case] distance: f64,
    ) {
        let paths = floyd_warshall_with_paths(&diamond()).expect("weights present");
        let path = paths.path(start, end).expect("nodes in range");
        assert!(path.hops.is_empty());
        assert_eq!(path.distance, distance);
    }

    #[test]
    fn unreachable_path_serialises_infinity_as_token() {
        let paths = floyd_warshall_with_paths(&diamond()).expect("weights present");
        let unreachable = paths.path(3, 0).expect("nodes in range");
        let value = serde_json::to_value(&unreachable).expect("path must serialise");
        assert_eq!(value, serde_json::json!({ "hops": [], "distance": "inf" }));

        let reachable = paths.path(0, 1).expect("nodes in range");
        let value = serde_json::to_value(&reachable).expect("path must serialise");
        assert_eq!(value["distance"], serde_json::json!(1.0));
        assert_eq!(value["hops"][0]["weight"], serde_json::json!(1.0));
    }

    #[test]
    fn path_rejects_unknown_nodes() {
        let paths = floyd_warshall_with_paths(&diamond()).expect("weights present");
        assert_eq!(
            paths.path(0, 9),
            Err(OracleError::Graph(GraphError::InvalidNodeId {
                node: 9,
                node_count: 4
            }))
        );
    }

    #[test]
    fn path_walk_is_bounded_under_negative_cycles() {
        let graph = Graph::directed(3, [(0, 1, 1.0), (1, 0, -3.0), (1, 2, 1.0)])
            .expect("graph must build");
        let paths = floyd_warshall_with_paths(&graph).expect("weights present");
        assert!(matches!(
            paths.path(0, 2),
            Ok(_) | Err(OracleError::NegativeCyclePrecondition)
        ));
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(ShortestPathMatrix::from_rows(vec![vec![0.0, 1.0], vec![0.0]]).is_none());
        let square = ShortestPathMatrix::from_rows(vec![vec![0.0, 1.0], vec![2.0, 0.0]])
            .expect("square rows");
        assert_eq!(square.get(1, 0), Some(2.0));
        assert_eq!(square.rows().count(), 2);
    }

    #[test]
    fn empty_graph_yields_empty_matrix() {
        let graph = Graph::directed(0, []).expect("empty graph must build");
        let matrix = floyd_warshall(&graph).expect("no edges");
        assert_eq!(matrix.size(), 0);
        assert_eq!(matrix.rows().count(), 0);
    }

    proptest! {
        #![proptest_config(suite_proptest_config(48))]

        #[test]
        fn oracle_is_symmetric_on_undirected_non_negative_graphs(
            seed in any::<u64>(),
            nodes in 1_usize..14,
        ) {
            let mut generator = GraphGenerator::new(GeneratorConfig::new(seed));
            let generated = generator
                .generate(
                    EquivalenceClass::NonNegative,
                    GraphRequest::new(nodes).with_directed(false),
                )
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            let matrix = floyd_warshall(&generated.graph)
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            prop_assert!(matrix.is_symmetric());
        }

        #[test]
        fn oracle_is_idempotent(seed in any::<u64>(), nodes in 1_usize..14) {
            let mut generator = GraphGenerator::new(GeneratorConfig::new(seed));
            let generated = generator
                .generate(EquivalenceClass::NegativeNoCycle, GraphRequest::new(nodes))
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            let first = floyd_warshall(&generated.graph)
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            let second = floyd_warshall(&generated.graph)
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            prop_assert_eq!(first, second);
        }

        #[test]
        fn reconstructed_paths_match_matrix(seed in any::<u64>(), nodes in 2_usize..12) {
            let mut generator = GraphGenerator::new(GeneratorConfig::new(seed));
            let generated = generator
                .generate(EquivalenceClass::NegativeNoCycle, GraphRequest::new(nodes))
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            let paths = floyd_warshall_with_paths_checked(&generated.graph)
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            for start in 0..nodes {
                for end in 0..nodes {
                    let path = paths
                        .path(start, end)
                        .map_err(|err| TestCaseError::fail(err.to_string()))?;
                    let expected = if start == end {
                        0.0
                    } else {
                        paths.matrix().get(start, end).unwrap_or(f64::INFINITY)
                    };
                    prop_assert_eq!(path.distance, expected);
                    if path.is_reachable() && start != end {
                        let total: f64 = path.hops.iter().map(|hop| hop.weight).sum();
                        prop_assert_eq!(total, path.distance);
                    }
                }
            }
        }
    }
}
