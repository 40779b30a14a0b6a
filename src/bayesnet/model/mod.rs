pub mod domain;
pub mod estimator;
pub mod factor;
pub mod structure;

use crate::bayesnet::common::errors::NetworkError;
use crate::bayesnet::inference::BayesianNetwork;
use chrono::{DateTime, Utc};
use domain::{DomainRegistry, Variable};
use factor::Factor;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use structure::Structure;

/// One serialized conditional probability table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CptRecord {
    pub node: String,
    /// Scope names, node first, in table axis order
    pub scope: Vec<String>,
    /// Row-major cells
    pub values: Vec<f64>,
}

/// On-disk form of a fitted network: structure, domains and every CPT.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModelFile {
    /// Version for format compatibility
    pub version: u32,
    /// Timestamp when the model was saved
    pub timestamp: DateTime<Utc>,
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String)>,
    pub domains: Vec<Variable>,
    pub cpts: Vec<CptRecord>,
}

impl ModelFile {
    pub const CURRENT_VERSION: u32 = 1;

    /// Capture a fitted network.
    pub fn from_network(network: &BayesianNetwork) -> Result<Self, NetworkError> {
        let structure = network.structure();
        let cpts = network
            .cpts()?
            .map(|(node, cpt)| CptRecord {
                node: node.to_string(),
                scope: cpt.variable_names().into_iter().map(String::from).collect(),
                values: cpt.values().to_vec(),
            })
            .collect();
        Ok(ModelFile {
            version: Self::CURRENT_VERSION,
            timestamp: Utc::now(),
            nodes: structure.nodes().map(String::from).collect(),
            edges: structure
                .edges()
                .into_iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            domains: network.domains()?.iter().cloned().collect(),
            cpts,
        })
    }

    /// Rebuild and re-validate the fitted network.
    pub fn into_network(self) -> Result<BayesianNetwork, NetworkError> {
        let structure = Structure::build(&self.nodes, &self.edges)?;
        let domains = DomainRegistry::declare(self.domains)?;
        let cpts = self
            .cpts
            .into_iter()
            .map(|record| {
                let scope = record
                    .scope
                    .iter()
                    .map(|name| domains.get(name).cloned())
                    .collect::<Result<Vec<_>, _>>()?;
                if scope.first().map(Variable::name) != Some(record.node.as_str()) {
                    return Err(NetworkError::Shape(format!(
                        "CPT for '{}' does not lead with its node",
                        record.node
                    )));
                }
                Factor::new(scope, record.values)
            })
            .collect::<Result<Vec<_>, _>>()?;
        BayesianNetwork::from_parameters(structure, domains, cpts)
    }

    /// Save the model to a JSON file
    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn Error>> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("saved {} CPTs to {}", self.cpts.len(), path);
        Ok(())
    }

    /// Load a model from a JSON file
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn Error>> {
        let json = fs::read_to_string(path)?;
        let model: ModelFile = serde_json::from_str(&json)?;

        // Check version compatibility
        if model.version > Self::CURRENT_VERSION {
            return Err(format!(
                "Model file version {} is newer than supported version {}",
                model.version,
                Self::CURRENT_VERSION
            )
            .into());
        }

        info!("loaded {} CPTs saved at {}", model.cpts.len(), model.timestamp);
        Ok(model)
    }
}
