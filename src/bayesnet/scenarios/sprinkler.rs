use super::sampling::forward_sample;
use crate::bayesnet::common::errors::Result;
use crate::bayesnet::common::interface::{ScenarioMaker, ScenarioQuery};
use crate::bayesnet::inference::{BayesianNetwork, Query};
use crate::bayesnet::model::domain::{DomainRegistry, Variable};
use crate::bayesnet::model::factor::Factor;
use crate::bayesnet::model::structure::Structure;
use crate::data::Dataset;

pub const EDGES: [(&str, &str); 4] = [
    ("cloudy", "sprinkler"),
    ("cloudy", "rain"),
    ("sprinkler", "wet_grass"),
    ("rain", "wet_grass"),
];

fn boolean(name: &str) -> Result<Variable> {
    Variable::new(name, vec!["false".to_string(), "true".to_string()])
}

/// The classic cloudy/sprinkler/rain/wet-grass network with known CPTs.
///
/// Wet grass is impossible when neither the sprinkler nor the rain is on,
/// which makes it a handy source of zero-probability evidence.
pub fn reference_network() -> Result<BayesianNetwork> {
    let structure = Structure::from_edges(&EDGES)?;
    let cloudy = boolean("cloudy")?;
    let sprinkler = boolean("sprinkler")?;
    let rain = boolean("rain")?;
    let wet = boolean("wet_grass")?;

    let cpts = vec![
        Factor::new(vec![cloudy.clone()], vec![0.5, 0.5])?,
        // columns: cloudy = false, true
        Factor::new(
            vec![sprinkler.clone(), cloudy.clone()],
            vec![0.5, 0.9, 0.5, 0.1],
        )?,
        Factor::new(vec![rain.clone(), cloudy.clone()], vec![0.8, 0.2, 0.2, 0.8])?,
        // columns: (sprinkler, rain) = ff, ft, tf, tt
        Factor::new(
            vec![wet.clone(), sprinkler.clone(), rain.clone()],
            vec![1.0, 0.1, 0.1, 0.01, 0.0, 0.9, 0.9, 0.99],
        )?,
    ];
    let domains = DomainRegistry::declare([cloudy, sprinkler, rain, wet])?;
    BayesianNetwork::from_parameters(structure, domains, cpts)
}

/// Trains on rows sampled from [`reference_network`].
pub struct Sprinkler {
    pub rows: usize,
    pub seed: u64,
}

impl Default for Sprinkler {
    fn default() -> Self {
        Sprinkler {
            rows: 5000,
            seed: 42,
        }
    }
}

impl ScenarioMaker for Sprinkler {
    fn name(&self) -> &str {
        "sprinkler"
    }

    fn structure(&self) -> Result<Structure> {
        Structure::from_edges(&EDGES)
    }

    fn training_data(&self) -> anyhow::Result<Option<Dataset>> {
        let reference = reference_network()?;
        Ok(Some(forward_sample(&reference, self.rows, self.seed)?))
    }

    fn queries(&self) -> Vec<ScenarioQuery> {
        vec![
            ScenarioQuery {
                description: "P(rain | wet grass)".to_string(),
                query: Query::new(["rain"]).given("wet_grass", "true"),
                reported: vec!["true".to_string()],
            },
            ScenarioQuery {
                description: "P(rain | wet grass, sprinkler on)".to_string(),
                query: Query::new(["rain"])
                    .given("wet_grass", "true")
                    .given("sprinkler", "true"),
                reported: vec!["true".to_string()],
            },
            ScenarioQuery {
                description: "P(sprinkler, rain | cloudy)".to_string(),
                query: Query::new(["sprinkler", "rain"]).given("cloudy", "true"),
                reported: vec!["true".to_string(), "true".to_string()],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_network_is_fitted() {
        let network = reference_network().unwrap();
        assert!(network.is_fitted());
        assert_eq!(network.structure().parents_of("wet_grass").unwrap(), vec!["sprinkler", "rain"]);
        let wet = network.cpt("wet_grass").unwrap();
        assert_eq!(wet.probability_of(&["true", "true", "true"]).unwrap(), 0.99);
    }

    #[test]
    fn test_sampling_is_seeded() {
        let network = reference_network().unwrap();
        let a = forward_sample(&network, 200, 7).unwrap();
        let b = forward_sample(&network, 200, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.columns(), &["cloudy", "sprinkler", "rain", "wet_grass"]);
        // no row may show wet grass with both causes off
        for row in a.rows() {
            if row[1] == "false" && row[2] == "false" {
                assert_eq!(row[3], "false");
            }
        }
    }
}
