//! Plain-text rendering of CPTs and posteriors for the command line.

use crate::bayesnet::common::errors::Result;
use crate::bayesnet::inference::Posterior;
use crate::bayesnet::model::estimator::parent_states;
use crate::bayesnet::model::factor::Factor;
use colored::Colorize;
use std::fmt::Write;

/// One line per parent assignment, listing `state=p` for the child.
///
/// The CPT's first variable is the child; the rest are its parents.
pub fn render_cpt(cpt: &Factor) -> Result<String> {
    let scope = cpt.scope();
    let Some(node) = scope.first() else {
        return Ok(String::new());
    };
    let parents: Vec<&str> = cpt.variable_names().into_iter().skip(1).collect();
    let columns = cpt.len() / node.cardinality();

    let mut out = String::new();
    let header = if parents.is_empty() {
        format!("P({})", node.name())
    } else {
        format!("P({} | {})", node.name(), parents.join(", "))
    };
    let _ = writeln!(out, "{}", header.bold());

    for j in 0..columns {
        let condition: Vec<String> = parent_states(scope, j)
            .into_iter()
            .map(|(name, state)| format!("{}={}", name, state))
            .collect();
        let cells: Vec<String> = node
            .states()
            .iter()
            .enumerate()
            .map(|(k, state)| format!("{}={:.4}", state, cpt.values()[k * columns + j]))
            .collect();
        if condition.is_empty() {
            let _ = writeln!(out, "  {}", cells.join("  "));
        } else {
            let _ = writeln!(out, "  {} : {}", condition.join(", "), cells.join("  "));
        }
    }
    Ok(out)
}

/// Every state tuple with its probability, highest first.
pub fn render_posterior(posterior: &Posterior) -> String {
    let mut rows: Vec<(Vec<&str>, f64)> = posterior.iter().collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
    let targets = posterior.targets();

    let mut out = String::new();
    for (states, p) in rows {
        let assignment: Vec<String> = targets
            .iter()
            .zip(states)
            .map(|(name, state)| format!("{}={}", name, state))
            .collect();
        let _ = writeln!(out, "  {:<40} {:.4}", assignment.join(", "), p);
    }
    out
}
