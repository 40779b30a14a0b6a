use crate::bayesnet::common::errors::Result;
use crate::bayesnet::common::interface::{ScenarioMaker, ScenarioQuery};
use crate::bayesnet::inference::Query;
use crate::bayesnet::model::structure::Structure;
use crate::data::{BinSpec, UpperEdge};

/// Risk factors -> chronic conditions -> symptoms -> test -> diagnosis.
pub const EDGES: [(&str, &str); 14] = [
    // risk factors to chronic conditions
    ("age_binned", "trestbps_binned"),
    ("age_binned", "chol_binned"),
    ("sex", "chol_binned"),
    ("fbs", "chol_binned"),
    // chronic conditions to symptoms
    ("chol_binned", "exang"),
    ("trestbps_binned", "cp"),
    // symptoms to the exercise test
    ("cp", "oldpeak_binned"),
    ("exang", "oldpeak_binned"),
    // everything converges on the diagnosis
    ("age_binned", "target"),
    ("sex", "target"),
    ("oldpeak_binned", "target"),
    ("ca", "target"),
    ("thalach_binned", "target"),
    ("restecg", "target"),
];

pub const CATEGORICAL: [&str; 7] = ["sex", "cp", "fbs", "restecg", "exang", "ca", "target"];

/// Cleveland heart-disease network over twelve discretized variables.
pub struct HeartDisease {}

impl ScenarioMaker for HeartDisease {
    fn name(&self) -> &str {
        "heart_disease"
    }

    fn structure(&self) -> Result<Structure> {
        Structure::from_edges(&EDGES)
    }

    fn categorical_columns(&self) -> Vec<String> {
        CATEGORICAL.iter().map(|c| c.to_string()).collect()
    }

    fn bins(&self) -> anyhow::Result<Vec<BinSpec>> {
        let specs = [
            BinSpec::new(
                "age",
                "age_binned",
                &[28.0, 50.0, 65.0],
                UpperEdge::DataMaxPlus(1.0),
                &["Young", "Middle", "Old"],
            ),
            BinSpec::new(
                "trestbps",
                "trestbps_binned",
                &[93.0, 120.0, 140.0],
                UpperEdge::DataMaxPlus(1.0),
                &["Normal", "Pre_HTN", "HTN"],
            ),
            BinSpec::new(
                "chol",
                "chol_binned",
                &[125.0, 200.0, 240.0],
                UpperEdge::DataMaxPlus(1.0),
                &["Normal", "Borderline", "High"],
            ),
            BinSpec::new(
                "thalach",
                "thalach_binned",
                &[71.0, 140.0],
                UpperEdge::DataMaxPlus(1.0),
                &["Low_Avg", "High"],
            ),
            BinSpec::new(
                "oldpeak",
                "oldpeak_binned",
                &[-0.1, 0.5, 2.5],
                UpperEdge::DataMaxPlus(1.0),
                &["Low", "Medium", "High"],
            ),
        ];
        specs.into_iter().collect()
    }

    fn queries(&self) -> Vec<ScenarioQuery> {
        vec![
            ScenarioQuery {
                description: "P(disease | age=Old, sex=male)".to_string(),
                query: Query::new(["target"])
                    .given("age_binned", "Old")
                    .given("sex", "1"),
                reported: vec!["1".to_string()],
            },
            ScenarioQuery {
                description: "P(disease | oldpeak=High, thalach=Low_Avg, ca=3)".to_string(),
                query: Query::new(["target"])
                    .given("oldpeak_binned", "High")
                    .given("thalach_binned", "Low_Avg")
                    .given("ca", "3"),
                reported: vec!["1".to_string()],
            },
            ScenarioQuery {
                description: "P(cholesterol=High | disease)".to_string(),
                query: Query::new(["chol_binned"]).given("target", "1"),
                reported: vec!["High".to_string()],
            },
            ScenarioQuery {
                description: "P(oldpeak=High | cp=2, exang=0)".to_string(),
                query: Query::new(["oldpeak_binned"])
                    .given("cp", "2")
                    .given("exang", "0"),
                reported: vec!["High".to_string()],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_cover_every_node() {
        let scenario = HeartDisease {};
        let bins = scenario.bins().unwrap();
        assert_eq!(bins.len(), 5);

        let mut columns: Vec<String> = scenario.categorical_columns();
        columns.extend(bins.into_iter().map(|spec| spec.output));
        columns.sort();
        let structure = scenario.structure().unwrap();
        let mut nodes: Vec<String> = structure.nodes().map(String::from).collect();
        nodes.sort();
        assert_eq!(columns, nodes);
    }
}
