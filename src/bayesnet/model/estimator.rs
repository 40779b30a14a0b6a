use super::domain::{DomainRegistry, Variable};
use super::factor::{Factor, row_major_strides};
use super::structure::Structure;
use crate::bayesnet::common::errors::{NetworkError, Result};
use crate::data::Dataset;
use clap::ValueEnum;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// What to do with a parent assignment that never occurs in the training rows.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
pub enum UnseenParentPolicy {
    /// Give the node a uniform distribution for that assignment.
    #[serde(rename = "uniform")]
    Uniform,
    /// Refuse to fit.
    #[serde(rename = "fail")]
    Fail,
}

/// Maximum-likelihood CPTs by frequency counting.
///
/// Returns one CPT per node in `structure.nodes()` order. Each CPT's scope is
/// `[node, parents..]` with parents in declaration order, so the node varies
/// slowest in the flat table. Rows with a blank cell anywhere in a node's
/// family are left out of that node's counts.
pub fn estimate(
    structure: &Structure,
    domains: &DomainRegistry,
    data: &Dataset,
    policy: UnseenParentPolicy,
) -> Result<Vec<Factor>> {
    if data.is_empty() {
        return Err(NetworkError::Domain("training table has no rows".to_string()));
    }
    info!(
        "estimating {} CPTs from {} rows ({:?} policy for unseen parents)",
        structure.node_count(),
        data.len(),
        policy
    );
    structure
        .nodes()
        .map(|node| estimate_node(structure, domains, data, node, policy))
        .collect()
}

fn estimate_node(
    structure: &Structure,
    domains: &DomainRegistry,
    data: &Dataset,
    node: &str,
    policy: UnseenParentPolicy,
) -> Result<Factor> {
    let mut family: Vec<Variable> = vec![domains.get(node)?.clone()];
    for parent in structure.parents_of(node)? {
        family.push(domains.get(parent)?.clone());
    }
    let columns = family
        .iter()
        .map(|v| {
            data.column_index(v.name()).ok_or_else(|| {
                NetworkError::Domain(format!("column '{}' is missing from the data", v.name()))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let shape: Vec<usize> = family.iter().map(Variable::cardinality).collect();
    let strides = row_major_strides(&shape);
    let mut counts = vec![0.0f64; shape.iter().product()];
    let mut skipped = 0usize;
    'rows: for row in data.rows() {
        let mut flat = 0;
        for ((variable, &column), &stride) in family.iter().zip(&columns).zip(&strides) {
            let cell = row[column].as_str();
            if cell.is_empty() {
                skipped += 1;
                continue 'rows;
            }
            flat += variable.state_index(cell)? * stride;
        }
        counts[flat] += 1.0;
    }
    if skipped > 0 {
        debug!("{}: skipped {} rows with missing values", node, skipped);
    }

    // node is axis 0, so a parent assignment j owns cells j, j + width, ...
    let node_card = shape[0];
    let width = counts.len() / node_card;
    for j in 0..width {
        let total: f64 = (0..node_card).map(|k| counts[k * width + j]).sum();
        if total > 0.0 {
            for k in 0..node_card {
                counts[k * width + j] /= total;
            }
            continue;
        }
        let parents = parent_states(&family, j);
        match policy {
            UnseenParentPolicy::Uniform => {
                warn!(
                    "{}: no rows for parents {:?}, using a uniform distribution",
                    node, parents
                );
                for k in 0..node_card {
                    counts[k * width + j] = 1.0 / node_card as f64;
                }
            }
            UnseenParentPolicy::Fail => {
                return Err(NetworkError::UnobservedParentCombination {
                    node: node.to_string(),
                    parents,
                });
            }
        }
    }

    debug!("{}: CPT over {:?} with {} cells", node, shape, counts.len());
    Factor::new(family, counts)
}

/// Decode parent-assignment offset `j` of a `[node, parents..]` table into labels.
pub(crate) fn parent_states(family: &[Variable], mut j: usize) -> Vec<(String, String)> {
    let mut states = Vec::with_capacity(family.len().saturating_sub(1));
    for parent in family.iter().skip(1).rev() {
        let index = j % parent.cardinality();
        j /= parent.cardinality();
        states.push((
            parent.name().to_string(),
            parent.states()[index].clone(),
        ));
    }
    states.reverse();
    states
}
