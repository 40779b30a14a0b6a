#[macro_use]
pub mod bayesnet;
pub mod data;
pub mod report;

pub use bayesnet::{BayesianNetwork, NetworkError, Query};
pub use data::Dataset;
