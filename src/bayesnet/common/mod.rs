pub mod errors;
pub mod interface;
#[macro_use]
pub mod logging;
pub mod setup;

// Re-export key types
pub use errors::{NetworkError, Result};
pub use interface::ScenarioMaker;
