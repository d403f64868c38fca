//! Serde model of the on-disk corpus document.
//!
//! Graphs use the node-link layout (`directed`, `multigraph`, `graph`,
//! `nodes`, `links`) so corpora written by other node-link tooling load
//! unchanged. Matrix cells are JSON numbers, or the string tokens `"inf"`,
//! `"-inf"` and `"nan"` for non-finite values.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{
    Edge, Graph, ShortestPathMatrix,
    error::CorpusError,
    generate::EquivalenceClass,
};

use super::TestCase;

const POSITIVE_INFINITY: &str = "inf";
const NEGATIVE_INFINITY: &str = "-inf";
const NOT_A_NUMBER: &str = "nan";

#[derive(Debug, Deserialize, Serialize)]
pub(super) struct CaseRecord {
    graph: NodeLinkGraph,
    shortest_path_matrix: Option<Vec<Vec<Cell>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class: Option<EquivalenceClass>,
}

#[derive(Debug, Deserialize, Serialize)]
struct NodeLinkGraph {
    directed: bool,
    #[serde(default)]
    multigraph: bool,
    #[serde(default)]
    graph: Map<String, Value>,
    nodes: Vec<NodeRecord>,
    #[serde(alias = "edges")]
    links: Vec<LinkRecord>,
}

#[derive(Debug, Deserialize, Serialize)]
struct NodeRecord {
    id: usize,
}

#[derive(Debug, Deserialize, Serialize)]
struct LinkRecord {
    source: usize,
    target: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
}

/// A matrix cell with sentinel encoding for non-finite values.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawCell", into = "RawCell")]
pub(super) struct Cell(pub(super) f64);

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum RawCell {
    Number(f64),
    Token(String),
}

impl From<Cell> for RawCell {
    fn from(Cell(value): Cell) -> Self {
        if value.is_nan() {
            Self::Token(NOT_A_NUMBER.to_owned())
        } else if value == f64::INFINITY {
            Self::Token(POSITIVE_INFINITY.to_owned())
        } else if value == f64::NEG_INFINITY {
            Self::Token(NEGATIVE_INFINITY.to_owned())
        } else {
            Self::Number(value)
        }
    }
}

/// Serialises a distance with the same sentinel tokens as matrix cells.
pub(crate) fn serialize_distance<S: Serializer>(
    value: &f64,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    RawCell::from(Cell(*value)).serialize(serializer)
}

impl TryFrom<RawCell> for Cell {
    type Error = String;

    fn try_from(raw: RawCell) -> Result<Self, Self::Error> {
        match raw {
            RawCell::Number(value) => Ok(Self(value)),
            RawCell::Token(token) => match token.as_str() {
                POSITIVE_INFINITY => Ok(Self(f64::INFINITY)),
                NEGATIVE_INFINITY => Ok(Self(f64::NEG_INFINITY)),
                NOT_A_NUMBER => Ok(Self(f64::NAN)),
                other => Err(format!(
                    "unknown matrix token `{other}`; expected a number, \"inf\", \"-inf\", or \"nan\""
                )),
            },
        }
    }
}

impl CaseRecord {
    pub(super) fn from_case(case: &TestCase) -> Self {
        let graph = case.graph();
        Self {
            graph: NodeLinkGraph {
                directed: graph.is_directed(),
                multigraph: false,
                graph: Map::new(),
                nodes: (0..graph.node_count()).map(|id| NodeRecord { id }).collect(),
                links: graph
                    .edges()
                    .iter()
                    .map(|edge| LinkRecord {
                        source: edge.source(),
                        target: edge.target(),
                        weight: edge.weight(),
                    })
                    .collect(),
            },
            shortest_path_matrix: case.matrix().map(|matrix| {
                matrix
                    .rows()
                    .map(|row| row.iter().copied().map(Cell).collect())
                    .collect()
            }),
            class: case.class(),
        }
    }

    /// Validates the record and converts it into a [`TestCase`].
    pub(super) fn into_case(self, index: usize) -> Result<TestCase, CorpusError> {
        let invalid = |reason: String| CorpusError::Invalid {
            case: index,
            reason,
        };
        let Self {
            graph,
            shortest_path_matrix,
            class,
        } = self;

        if graph.multigraph {
            return Err(invalid("multigraphs are not supported".to_owned()));
        }
        let node_count = graph.nodes.len();
        let mut seen = vec![false; node_count];
        for node in &graph.nodes {
            match seen.get_mut(node.id) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => return Err(invalid(format!("node {} is listed twice", node.id))),
                None => {
                    return Err(invalid(format!(
                        "node id {} is outside 0..{node_count}",
                        node.id
                    )));
                }
            }
        }

        let edges = graph
            .links
            .into_iter()
            .map(|link| match link.weight {
                Some(weight) => Edge::new(link.source, link.target, weight),
                None => Edge::unweighted(link.source, link.target),
            })
            .collect();
        let graph = Graph::new(node_count, graph.directed, edges).map_err(|source| {
            CorpusError::Graph {
                case: index,
                source,
            }
        })?;

        let matrix = match shortest_path_matrix {
            None => None,
            Some(rows) => {
                let rows: Vec<Vec<f64>> = rows
                    .into_iter()
                    .map(|row| row.into_iter().map(|Cell(value)| value).collect())
                    .collect();
                let matrix = ShortestPathMatrix::from_rows(rows)
                    .ok_or_else(|| invalid("shortest-path matrix is not square".to_owned()))?;
                Some(matrix)
            }
        };

        TestCase::new(graph, matrix, class).map_err(|err| invalid(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(f64::INFINITY, "\"inf\"")]
    #[case(f64::NEG_INFINITY, "\"-inf\"")]
    #[case(f64::NAN, "\"nan\"")]
    #[case(2.5, "2.5")]
    #[case(-7.0, "-7.0")]
    fn cells_encode_with_sentinel_tokens(#[case] value: f64, #[case] expected: &str) {
        let encoded = serde_json::to_string(&Cell(value)).expect("cell must encode");
        assert_eq!(encoded, expected);
    }

    #[rstest]
    #[case("\"inf\"", f64::INFINITY)]
    #[case("\"-inf\"", f64::NEG_INFINITY)]
    #[case("3", 3.0)]
    #[case("-0.25", -0.25)]
    fn cells_decode_tokens_and_numbers(#[case] raw: &str, #[case] expected: f64) {
        let Cell(value) = serde_json::from_str(raw).expect("cell must decode");
        assert_eq!(value, expected);
    }

    #[test]
    fn nan_token_decodes_to_nan() {
        let Cell(value) = serde_json::from_str("\"nan\"").expect("cell must decode");
        assert!(value.is_nan());
    }

    #[rstest]
    #[case("\"Infinity\"")]
    #[case("\"INF\"")]
    #[case("\"\"")]
    #[case("null")]
    fn unknown_tokens_are_rejected(#[case] raw: &str) {
        assert!(serde_json::from_str::<Cell>(raw).is_err());
    }

    #[test]
    fn edges_key_is_accepted_as_links() {
        let raw = r#"{
            "graph": {
                "directed": true,
                "nodes": [{"id": 0}, {"id": 1}],
                "edges": [{"source": 0, "target": 1, "weight": 4}]
            },
            "shortest_path_matrix": null
        }"#;
        let record: CaseRecord = serde_json::from_str(raw).expect("record must decode");
        let case = record.into_case(0).expect("record must be valid");
        assert_eq!(case.graph().weight(0, 1), Ok(Some(4.0)));
        assert!(case.matrix().is_none());
    }
}
