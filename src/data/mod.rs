//! Training-table glue: CSV input and binning of numeric columns.
//! The engine only reads [`Dataset`] through its accessors.

pub mod discretize;
pub mod table;

pub use discretize::{BinSpec, UpperEdge, discretize};
pub use table::Dataset;
