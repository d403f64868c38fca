//! Weighted graph model shared by every pathwise component.
//!
//! A [`Graph`] is a fixed set of nodes `0..n` plus a validated edge list.
//! Directedness is a flag rather than a type parameter: undirected edges are
//! stored once and expanded into two relaxation arcs on demand.

use std::collections::HashMap;

use crate::error::GraphError;

/// A single edge as supplied to [`Graph::new`].
///
/// The weight is optional so that graphs loaded from external corpora can
/// represent edges without a weight attribute. Algorithms reject such edges
/// with [`GraphError::MissingWeight`] instead of treating them as zero.
///
/// # Examples
/// ```
/// use pathwise_core::Edge;
///
/// let edge = Edge::new(0, 1, 2.5);
/// assert_eq!(edge.weight(), Some(2.5));
/// assert!(Edge::unweighted(0, 1).weight().is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    source: usize,
    target: usize,
    weight: Option<f64>,
}

impl Edge {
    /// Creates a weighted edge.
    #[must_use]
    pub const fn new(source: usize, target: usize, weight: f64) -> Self {
        Self {
            source,
            target,
            weight: Some(weight),
        }
    }

    /// Creates an edge without a weight attribute.
    #[must_use]
    pub const fn unweighted(source: usize, target: usize) -> Self {
        Self {
            source,
            target,
            weight: None,
        }
    }

    /// Returns the tail endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn source(&self) -> usize { self.source }

    /// Returns the head endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn target(&self) -> usize { self.target }

    /// Returns the weight, if the edge carries one.
    #[must_use]
    #[rustfmt::skip]
    pub const fn weight(&self) -> Option<f64> { self.weight }

    /// Returns the weight or [`GraphError::MissingWeight`].
    ///
    /// # Errors
    /// Fails when the edge has no weight attribute.
    pub const fn require_weight(&self) -> Result<f64, GraphError> {
        match self.weight {
            Some(weight) => Ok(weight),
            None => Err(GraphError::MissingWeight {
                from: self.source,
                to: self.target,
            }),
        }
    }
}

/// A directed relaxation step derived from an [`Edge`].
///
/// Undirected edges yield two arcs with the same weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedArc {
    /// Tail of the arc.
    pub from: usize,
    /// Head of the arc.
    pub to: usize,
    /// Weight carried by the arc.
    pub weight: f64,
}

/// A finite weighted graph over the nodes `0..node_count`.
///
/// # Examples
/// ```
/// use pathwise_core::Graph;
///
/// let graph = Graph::undirected(3, [(0, 1, 4.0), (1, 2, 1.0)])?;
/// assert_eq!(graph.weight(1, 0)?, Some(4.0));
/// assert_eq!(graph.weight(0, 2)?, None);
/// # Ok::<(), pathwise_core::GraphError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    node_count: usize,
    directed: bool,
    edges: Vec<Edge>,
    lookup: HashMap<(usize, usize), usize>,
}

impl Graph {
    /// Builds a graph from an explicit node count and edge list.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidNodeId`] for endpoints outside
    /// `0..node_count`, [`GraphError::SelfLoop`] for loops,
    /// [`GraphError::DuplicateEdge`] when a node pair repeats (in either
    /// orientation for undirected graphs), and
    /// [`GraphError::NonFiniteWeight`] for NaN or infinite weights.
    pub fn new(node_count: usize, directed: bool, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut lookup = HashMap::with_capacity(edges.len());
        for (index, edge) in edges.iter().enumerate() {
            for node in [edge.source, edge.target] {
                if node >= node_count {
                    return Err(GraphError::InvalidNodeId { node, node_count });
                }
            }
            if edge.source == edge.target {
                return Err(GraphError::SelfLoop { node: edge.source });
            }
            if let Some(weight) = edge.weight
                && !weight.is_finite()
            {
                return Err(GraphError::NonFiniteWeight {
                    from: edge.source,
                    to: edge.target,
                    weight,
                });
            }
            let key = lookup_key(directed, edge.source, edge.target);
            if lookup.insert(key, index).is_some() {
                return Err(GraphError::DuplicateEdge {
                    from: edge.source,
                    to: edge.target,
                });
            }
        }

        Ok(Self {
            node_count,
            directed,
            edges,
            lookup,
        })
    }

    /// Builds a directed graph from `(source, target, weight)` triples.
    ///
    /// # Errors
    /// See [`Graph::new`].
    pub fn directed(
        node_count: usize,
        edges: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Result<Self, GraphError> {
        Self::new(node_count, true, collect_edges(edges))
    }

    /// Builds an undirected graph from `(u, v, weight)` triples.
    ///
    /// # Errors
    /// See [`Graph::new`].
    pub fn undirected(
        node_count: usize,
        edges: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Result<Self, GraphError> {
        Self::new(node_count, false, collect_edges(edges))
    }

    /// Returns the number of nodes.
    #[must_use]
    #[rustfmt::skip]
    pub const fn node_count(&self) -> usize { self.node_count }

    /// Returns the number of stored edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns whether edges are one-way.
    #[must_use]
    #[rustfmt::skip]
    pub const fn is_directed(&self) -> bool { self.directed }

    /// Returns the edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the edge connecting `source` to `target`, if any.
    ///
    /// For undirected graphs the lookup is symmetric.
    #[must_use]
    pub fn edge(&self, source: usize, target: usize) -> Option<&Edge> {
        self.lookup
            .get(&lookup_key(self.directed, source, target))
            .and_then(|&index| self.edges.get(index))
    }

    /// Looks up the weight between two nodes.
    ///
    /// `Ok(None)` means there is no edge. A present edge without a weight is
    /// an error rather than a sentinel value.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidNodeId`] for out-of-range nodes and
    /// [`GraphError::MissingWeight`] when the edge exists but has no weight.
    pub fn weight(&self, source: usize, target: usize) -> Result<Option<f64>, GraphError> {
        self.check_node(source)?;
        self.check_node(target)?;
        self.edge(source, target)
            .map(|edge| {
                edge.weight.ok_or(GraphError::MissingWeight {
                    from: source,
                    to: target,
                })
            })
            .transpose()
    }

    /// Returns `true` when every edge carries a weight.
    #[must_use]
    pub fn is_fully_weighted(&self) -> bool {
        self.edges.iter().all(|edge| edge.weight.is_some())
    }

    /// Returns `true` when any weighted edge is negative.
    #[must_use]
    pub fn has_negative_edge(&self) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.weight.is_some_and(|weight| weight < 0.0))
    }

    /// Expands the edge list into directed relaxation arcs.
    ///
    /// Undirected edges produce both orientations.
    ///
    /// # Errors
    /// Returns [`GraphError::MissingWeight`] for the first unweighted edge.
    pub fn weighted_arcs(&self) -> Result<Vec<WeightedArc>, GraphError> {
        let per_edge = if self.directed { 1 } else { 2 };
        let mut arcs = Vec::with_capacity(self.edges.len() * per_edge);
        for edge in &self.edges {
            let weight = edge.require_weight()?;
            arcs.push(WeightedArc {
                from: edge.source,
                to: edge.target,
                weight,
            });
            if !self.directed {
                arcs.push(WeightedArc {
                    from: edge.target,
                    to: edge.source,
                    weight,
                });
            }
        }
        Ok(arcs)
    }

    /// Returns the outgoing `(neighbour, weight)` pairs of every node.
    ///
    /// # Errors
    /// Returns [`GraphError::MissingWeight`] for the first unweighted edge.
    pub fn adjacency(&self) -> Result<Vec<Vec<(usize, f64)>>, GraphError> {
        let mut adjacency = vec![Vec::new(); self.node_count];
        for arc in self.weighted_arcs()? {
            if let Some(neighbours) = adjacency.get_mut(arc.from) {
                neighbours.push((arc.to, arc.weight));
            }
        }
        Ok(adjacency)
    }

    /// Returns the largest simple-graph edge count for `node_count` nodes.
    ///
    /// # Examples
    /// ```
    /// use pathwise_core::Graph;
    ///
    /// assert_eq!(Graph::max_edge_count(4, true), 12);
    /// assert_eq!(Graph::max_edge_count(4, false), 6);
    /// ```
    #[must_use]
    pub const fn max_edge_count(node_count: usize, directed: bool) -> usize {
        let ordered = node_count.saturating_mul(node_count.saturating_sub(1));
        if directed { ordered } else { ordered / 2 }
    }

    /// Overwrites the weight of the edge at `index`.
    pub(crate) fn set_weight(&mut self, index: usize, weight: f64) {
        if let Some(edge) = self.edges.get_mut(index) {
            edge.weight = Some(weight);
        }
    }

    pub(crate) fn check_node(&self, node: usize) -> Result<(), GraphError> {
        if node < self.node_count {
            Ok(())
        } else {
            Err(GraphError::InvalidNodeId {
                node,
                node_count: self.node_count,
            })
        }
    }
}

fn collect_edges(edges: impl IntoIterator<Item = (usize, usize, f64)>) -> Vec<Edge> {
    edges
        .into_iter()
        .map(|(source, target, weight)| Edge::new(source, target, weight))
        .collect()
}

const fn lookup_key(directed: bool, source: usize, target: usize) -> (usize, usize) {
    if directed || source <= target {
        (source, target)
    } else {
        (target, source)
    }
}
