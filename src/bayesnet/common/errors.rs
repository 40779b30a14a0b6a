//! Error types for network construction, estimation and inference.

use thiserror::Error;

/// Failures reported by the engine.
///
/// Every variant is returned at the boundary of the call that detected it.
/// Nothing in the engine substitutes a default probability for a failure.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// A column the structure needs is missing from the data, or has no
    /// observed states.
    #[error("domain error: {0}")]
    Domain(String),

    /// The structure or a query references a variable that was never declared.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// The edge list does not describe a DAG.
    ///
    /// Carries the variables that could not be placed in a topological order.
    #[error("structure contains a cycle through {0:?}")]
    Cycle(Vec<String>),

    /// Estimation met a parent assignment with no training rows while the
    /// policy forbids filling it.
    #[error("node '{node}' has no training rows for parent assignment {parents:?}")]
    UnobservedParentCombination {
        node: String,
        parents: Vec<(String, String)>,
    },

    /// A state label outside the variable's domain.
    #[error("state '{state}' is not in the domain of '{variable}'")]
    UnknownState { variable: String, state: String },

    /// Empty target set, duplicated target or target/evidence overlap.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The factor sums to exactly zero, so the evidence is impossible under
    /// the fitted model.
    #[error("evidence has zero probability under the model")]
    ZeroMass,

    /// A query was issued against a model that has no CPTs yet.
    #[error("model has not been fitted")]
    ModelNotFitted,

    /// A table whose size does not match the product of its scope's domains.
    #[error("table shape mismatch: {0}")]
    Shape(String),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
