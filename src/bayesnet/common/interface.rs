use crate::bayesnet::common::errors::Result;
use crate::bayesnet::inference::Query;
use crate::bayesnet::model::structure::Structure;
use crate::data::{BinSpec, Dataset};

/// A canned question for a scenario, with the target states worth reporting.
#[derive(Debug, Clone)]
pub struct ScenarioQuery {
    pub description: String,
    pub query: Query,
    /// One state per target; the probability of this tuple is the headline
    /// number for the question.
    pub reported: Vec<String>,
}

/// A named network definition: the DAG, how raw columns become labels, and
/// optionally bundled training rows and questions.
pub trait ScenarioMaker {
    fn name(&self) -> &str;

    fn structure(&self) -> Result<Structure>;

    /// Columns copied through unchanged when discretizing raw data.
    fn categorical_columns(&self) -> Vec<String> {
        Vec::new()
    }

    /// Numeric columns binned into labels when discretizing raw data.
    fn bins(&self) -> anyhow::Result<Vec<BinSpec>> {
        Ok(Vec::new())
    }

    /// Training rows shipped with the scenario, if any.
    fn training_data(&self) -> anyhow::Result<Option<Dataset>> {
        Ok(None)
    }

    fn queries(&self) -> Vec<ScenarioQuery> {
        Vec::new()
    }
}
