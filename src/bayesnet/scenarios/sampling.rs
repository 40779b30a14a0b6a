use crate::bayesnet::inference::BayesianNetwork;
use crate::data::Dataset;
use anyhow::{Result, anyhow};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Ancestral sampling from a fitted network: every row draws each node in
/// topological order from its CPT column for the parents already drawn.
///
/// Columns come out in node declaration order. The same seed always yields
/// the same table.
pub fn forward_sample(network: &BayesianNetwork, rows: usize, seed: u64) -> Result<Dataset> {
    let structure = network.structure();
    let order = structure.topological_order();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut table = Vec::with_capacity(rows);
    for _ in 0..rows {
        let mut drawn: HashMap<&str, &str> = HashMap::new();
        for &node in &order {
            let cpt = network.cpt(node)?;
            let names = cpt.variable_names();
            let variable = &cpt.scope()[0];

            let mut states = Vec::with_capacity(names.len());
            states.push("");
            for parent in &names[1..] {
                let state = drawn
                    .get(parent)
                    .copied()
                    .ok_or_else(|| anyhow!("parent '{}' of '{}' not drawn yet", parent, node))?;
                states.push(state);
            }

            let u = rng.r#gen::<f64>();
            let mut cumulative = 0.0;
            let mut chosen = None;
            for state in variable.states() {
                states[0] = state.as_str();
                cumulative += cpt.probability_of(&states)?;
                if u < cumulative {
                    chosen = Some(state.as_str());
                    break;
                }
            }
            // rounding can leave `cumulative` a hair under one
            let chosen = match chosen {
                Some(state) => state,
                None => variable
                    .states()
                    .last()
                    .map(String::as_str)
                    .ok_or_else(|| anyhow!("'{}' has no states", node))?,
            };
            drawn.insert(node, chosen);
        }
        let row = structure
            .nodes()
            .map(|node| drawn.get(node).map(|s| s.to_string()).unwrap_or_default())
            .collect();
        table.push(row);
    }

    debug!("sampled {} rows with seed {}", rows, seed);
    Dataset::new(structure.nodes().map(String::from).collect(), table)
}
