//! Calling contract for candidate shortest-path algorithms.
//!
//! A candidate is anything implementing [`Candidate`]: it computes the
//! distance between two nodes of a [`Graph`] and describes its own calling
//! convention through a [`CandidateSignature`]. [`validate`] checks the
//! descriptor once, before any sampling, and wraps a conforming candidate in
//! a [`ValidatedCandidate`], the only form the runner accepts.
//!
//! Plain closures of type `Fn(&Graph, usize, usize) -> f64` implement
//! [`Candidate`] with the conforming signature, so the compiler enforces the
//! contract for them. Adapters around foreign or dynamically described
//! algorithms override [`Candidate::signature`] to report what they accept.

use std::fmt;

use crate::{Graph, error::ContractViolation};

/// A declared parameter or return type.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueType {
    /// An undirected graph.
    Graph,
    /// A directed graph.
    DiGraph,
    /// An integer.
    Integer,
    /// A floating-point number.
    Float,
    /// A boolean.
    Boolean,
    /// A string.
    Text,
    /// No declared type.
    Unknown,
}

impl ValueType {
    /// Returns `true` for either graph type.
    #[must_use]
    pub const fn is_graph(self) -> bool {
        matches!(self, Self::Graph | Self::DiGraph)
    }

    /// Returns the stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::DiGraph => "digraph",
            Self::Integer => "int",
            Self::Float => "float",
            Self::Boolean => "bool",
            Self::Text => "str",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed parameter of a [`CandidateSignature`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
    name: String,
    ty: ValueType,
}

impl Parameter {
    /// Creates a parameter descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Returns the declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    #[rustfmt::skip]
    pub const fn ty(&self) -> ValueType { self.ty }
}

/// The declared parameters and return type of a candidate.
///
/// # Examples
/// ```
/// use pathwise_core::{CandidateSignature, ValueType};
///
/// let signature = CandidateSignature::returning(ValueType::Float)
///     .with_parameter("graph", ValueType::DiGraph)
///     .with_parameter("start", ValueType::Integer)
///     .with_parameter("end", ValueType::Integer);
/// assert_eq!(signature.arity(), 3);
/// assert_eq!(signature, CandidateSignature::conforming().with_graph_type(ValueType::DiGraph));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CandidateSignature {
    parameters: Vec<Parameter>,
    returns: ValueType,
}

impl CandidateSignature {
    /// Creates a signature with no parameters.
    #[must_use]
    pub const fn returning(returns: ValueType) -> Self {
        Self {
            parameters: Vec::new(),
            returns,
        }
    }

    /// Returns the signature `(graph: Graph, start: int, end: int) -> float`.
    #[must_use]
    pub fn conforming() -> Self {
        Self::returning(ValueType::Float)
            .with_parameter("graph", ValueType::Graph)
            .with_parameter("start", ValueType::Integer)
            .with_parameter("end", ValueType::Integer)
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }

    /// Replaces the type of the first parameter.
    #[must_use]
    pub fn with_graph_type(mut self, ty: ValueType) -> Self {
        if let Some(first) = self.parameters.first_mut() {
            first.ty = ty;
        }
        self
    }

    /// Returns the declared parameters.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns the declared parameter count.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Returns the declared return type.
    #[must_use]
    #[rustfmt::skip]
    pub const fn returns(&self) -> ValueType { self.returns }
}

/// A single-pair shortest-path algorithm under test.
pub trait Candidate {
    /// Returns a display name used in logs and reports.
    fn name(&self) -> &str {
        "candidate"
    }

    /// Describes the calling convention of the candidate.
    fn signature(&self) -> CandidateSignature {
        CandidateSignature::conforming()
    }

    /// Returns the shortest distance from `start` to `end`.
    ///
    /// Unreachable targets are reported as `f64::INFINITY`.
    fn distance(&self, graph: &Graph, start: usize, end: usize) -> f64;
}

impl<F> Candidate for F
where
    F: Fn(&Graph, usize, usize) -> f64,
{
    fn distance(&self, graph: &Graph, start: usize, end: usize) -> f64 {
        self(graph, start, end)
    }
}

/// A candidate that passed [`validate`].
#[derive(Debug)]
pub struct ValidatedCandidate<'a, C: ?Sized> {
    candidate: &'a C,
    signature: CandidateSignature,
}

impl<'a, C: Candidate + ?Sized> ValidatedCandidate<'a, C> {
    /// Returns the wrapped candidate unchanged.
    #[must_use]
    #[rustfmt::skip]
    pub const fn inner(&self) -> &'a C { self.candidate }

    /// Returns the signature that was validated.
    #[must_use]
    #[rustfmt::skip]
    pub const fn signature(&self) -> &CandidateSignature { &self.signature }

    /// Returns the candidate's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.candidate.name()
    }

    /// Invokes the candidate.
    pub fn distance(&self, graph: &Graph, start: usize, end: usize) -> f64 {
        self.candidate.distance(graph, start, end)
    }
}

const EXPECTED_PARAMETERS: [(&str, fn(ValueType) -> bool); 3] = [
    ("a graph or digraph", ValueType::is_graph),
    ("an int", is_integer),
    ("an int", is_integer),
];

fn is_integer(ty: ValueType) -> bool {
    ty == ValueType::Integer
}

/// Checks the calling contract of `candidate`.
///
/// # Errors
/// Returns the first [`ContractViolation`] found, checking presence, then
/// arity, then the return type, then each parameter type in order.
///
/// # Examples
/// ```
/// use pathwise_core::{Graph, contract::validate};
///
/// let zero = |_: &Graph, _: usize, _: usize| 0.0;
/// let validated = validate(Some(&zero))?;
/// assert_eq!(validated.signature().arity(), 3);
/// # Ok::<(), pathwise_core::ContractViolation>(())
/// ```
pub fn validate<C: Candidate + ?Sized>(
    candidate: Option<&C>,
) -> Result<ValidatedCandidate<'_, C>, ContractViolation> {
    let candidate = candidate.ok_or(ContractViolation::MissingCandidate)?;
    let signature = candidate.signature();
    if signature.arity() != EXPECTED_PARAMETERS.len() {
        return Err(ContractViolation::WrongArity {
            found: signature.arity(),
        });
    }
    if signature.returns() != ValueType::Float {
        return Err(ContractViolation::WrongReturnType {
            found: signature.returns(),
        });
    }
    for (position, (parameter, (expected, accepts))) in signature
        .parameters()
        .iter()
        .zip(EXPECTED_PARAMETERS)
        .enumerate()
    {
        if !accepts(parameter.ty()) {
            return Err(ContractViolation::WrongParameterTypes {
                position,
                name: parameter.name().to_owned(),
                expected,
                found: parameter.ty(),
            });
        }
    }
    Ok(ValidatedCandidate {
        candidate,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::error::ContractViolationCode;

    #[derive(Debug)]
    struct Described(CandidateSignature);

    impl Candidate for Described {
        fn signature(&self) -> CandidateSignature {
            self.0.clone()
        }

        fn distance(&self, _: &Graph, _: usize, _: usize) -> f64 {
            0.0
        }
    }

    fn described(returns: ValueType, parameters: &[ValueType]) -> Described {
        let signature = parameters
            .iter()
            .enumerate()
            .fold(CandidateSignature::returning(returns), |signature, (index, ty)| {
                signature.with_parameter(format!("p{index}"), *ty)
            });
        Described(signature)
    }

    #[test]
    fn closures_conform() {
        let candidate = |graph: &Graph, _: usize, _: usize| graph.node_count() as f64;
        let validated = validate(Some(&candidate)).expect("closures conform");
        let graph = Graph::directed(4, []).expect("graph must build");
        assert_eq!(validated.distance(&graph, 0, 1), 4.0);
        assert_eq!(validated.name(), "candidate");
    }

    #[test]
    fn missing_candidate_is_reported() {
        let err = validate::<Described>(None).expect_err("nothing supplied");
        assert_eq!(err, ContractViolation::MissingCandidate);
    }

    #[test]
    fn two_parameters_is_wrong_arity() {
        let candidate = described(ValueType::Float, &[ValueType::Graph, ValueType::Integer]);
        let err = validate(Some(&candidate)).expect_err("two parameters");
        assert_eq!(err, ContractViolation::WrongArity { found: 2 });
        assert_eq!(err.code(), ContractViolationCode::WrongArity);
    }

    #[test]
    fn integer_return_is_wrong_return_type() {
        let candidate = described(
            ValueType::Integer,
            &[ValueType::Graph, ValueType::Integer, ValueType::Integer],
        );
        let err = validate(Some(&candidate)).expect_err("integer return");
        assert_eq!(
            err,
            ContractViolation::WrongReturnType {
                found: ValueType::Integer
            }
        );
    }

    #[test]
    fn arity_is_checked_before_return_type() {
        let candidate = described(ValueType::Integer, &[ValueType::Graph]);
        let err = validate(Some(&candidate)).expect_err("two problems");
        assert_eq!(err.code(), ContractViolationCode::WrongArity);
    }

    #[test]
    fn return_type_is_checked_before_parameters() {
        let candidate = described(
            ValueType::Text,
            &[ValueType::Text, ValueType::Text, ValueType::Text],
        );
        let err = validate(Some(&candidate)).expect_err("two problems");
        assert_eq!(err.code(), ContractViolationCode::WrongReturnType);
    }

    #[rstest]
    #[case::non_graph_first([ValueType::Integer, ValueType::Integer, ValueType::Integer], 0)]
    #[case::float_start([ValueType::Graph, ValueType::Float, ValueType::Integer], 1)]
    #[case::untyped_end([ValueType::DiGraph, ValueType::Integer, ValueType::Unknown], 2)]
    fn parameter_types_are_checked_in_order(
        #[case] parameters: [ValueType; 3],
        #[case] expected_position: usize,
    ) {
        let candidate = described(ValueType::Float, &parameters);
        let err = validate(Some(&candidate)).expect_err("bad parameter");
        let ContractViolation::WrongParameterTypes { position, name, .. } = err else {
            panic!("expected a parameter type violation, got {err:?}");
        };
        assert_eq!(position, expected_position);
        assert_eq!(name, format!("p{expected_position}"));
    }

    #[rstest]
    #[case(ValueType::Graph)]
    #[case(ValueType::DiGraph)]
    fn either_graph_type_conforms(#[case] graph_type: ValueType) {
        let candidate = Described(CandidateSignature::conforming().with_graph_type(graph_type));
        assert!(validate(Some(&candidate)).is_ok());
    }

    #[test]
    fn trait_objects_can_be_validated() {
        let candidate: Box<dyn Candidate> = Box::new(|_: &Graph, _: usize, _: usize| 1.5);
        let validated = validate(Some(candidate.as_ref())).expect("closure conforms");
        let graph = Graph::directed(1, []).expect("graph must build");
        assert_eq!(validated.distance(&graph, 0, 0), 1.5);
    }
}
