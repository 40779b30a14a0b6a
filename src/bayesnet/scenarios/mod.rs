pub mod factory;
pub mod heart_disease;
pub mod sampling;
pub mod sprinkler;
pub mod two_node;
