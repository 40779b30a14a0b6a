pub mod bayesian_network;
pub mod elimination;
pub mod query;

// Re-export the BayesianNetwork for easy access
pub use bayesian_network::{BayesianNetwork, FitConfig};
pub use elimination::EliminationOrdering;
pub use query::{Posterior, Query};
