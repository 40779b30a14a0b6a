pub mod common;
pub mod inference;
pub mod model;
pub mod scenarios;

// Re-export color printing macros
pub use crate::print_blue;
pub use crate::print_green;
pub use crate::print_red;
pub use crate::print_yellow;

/// Exports the main types for easy access
pub use common::errors::NetworkError;
pub use inference::{BayesianNetwork, EliminationOrdering, FitConfig, Posterior, Query};
pub use model::domain::{DomainRegistry, Variable};
pub use model::estimator::UnseenParentPolicy;
pub use model::factor::{Evidence, Factor};
pub use model::structure::Structure;
