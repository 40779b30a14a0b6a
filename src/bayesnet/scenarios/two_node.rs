use crate::bayesnet::common::errors::Result;
use crate::bayesnet::common::interface::{ScenarioMaker, ScenarioQuery};
use crate::bayesnet::inference::Query;
use crate::bayesnet::model::structure::Structure;
use crate::data::Dataset;

pub const ROWS: [[&str; 2]; 6] = [
    ["0", "0"],
    ["0", "0"],
    ["0", "1"],
    ["1", "1"],
    ["1", "1"],
    ["1", "1"],
];

/// `A -> B` with six rows, small enough to check every number by hand.
pub struct TwoNode {}

impl ScenarioMaker for TwoNode {
    fn name(&self) -> &str {
        "two_node"
    }

    fn structure(&self) -> Result<Structure> {
        Structure::from_edges(&[("A", "B")])
    }

    fn training_data(&self) -> anyhow::Result<Option<Dataset>> {
        let rows: Vec<&[&str]> = ROWS.iter().map(|row| row.as_slice()).collect();
        Ok(Some(Dataset::from_records(&["A", "B"], &rows)?))
    }

    fn queries(&self) -> Vec<ScenarioQuery> {
        vec![
            ScenarioQuery {
                description: "P(B=1 | A=0)".to_string(),
                query: Query::new(["B"]).given("A", "0"),
                reported: vec!["1".to_string()],
            },
            ScenarioQuery {
                description: "P(A=1 | B=1)".to_string(),
                query: Query::new(["A"]).given("B", "1"),
                reported: vec!["1".to_string()],
            },
            ScenarioQuery {
                description: "P(B=1)".to_string(),
                query: Query::new(["B"]),
                reported: vec!["1".to_string()],
            },
        ]
    }
}
