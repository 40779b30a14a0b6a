//! Exact inference by variable elimination.
//!
//! Every CPT is first reduced to the evidence. Hidden variables (neither
//! target nor evidence) are then eliminated one at a time: the active factors
//! that mention the variable are multiplied in ascending id order, the
//! variable is summed out and the product replaces them under a fresh id.
//! Whatever remains is multiplied, laid out in target order and normalized.

use super::query::Query;
use crate::bayesnet::common::errors::{NetworkError, Result};
use crate::bayesnet::model::domain::DomainRegistry;
use crate::bayesnet::model::factor::Factor;
use crate::bayesnet::model::structure::Structure;
use clap::ValueEnum;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Rule that fixes the order hidden variables are eliminated in.
///
/// Ordering only changes the size of intermediate tables, never the result.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EliminationOrdering {
    /// The structure's topological order, reversed: leaves go first.
    #[default]
    ReverseTopological,
    /// Greedy: the variable whose product table is smallest goes next, ties
    /// to the earlier variable in topological order.
    MinWeight,
}

pub struct VariableElimination<'a> {
    structure: &'a Structure,
    domains: &'a DomainRegistry,
    cpts: &'a [Factor],
    ordering: EliminationOrdering,
}

impl<'a> VariableElimination<'a> {
    /// `cpts` must be in `structure.nodes()` order.
    pub fn new(
        structure: &'a Structure,
        domains: &'a DomainRegistry,
        cpts: &'a [Factor],
        ordering: EliminationOrdering,
    ) -> Self {
        VariableElimination {
            structure,
            domains,
            cpts,
            ordering,
        }
    }

    /// Posterior over `query.targets`, normalized.
    pub fn query(&self, query: &Query) -> Result<Factor> {
        self.validate(query)?;

        // Scalars left over after reduction still scale the joint; a zero
        // here means the evidence itself is impossible.
        let mut constant = 1.0;
        let mut active: BTreeMap<usize, Factor> = BTreeMap::new();
        for (id, cpt) in self.cpts.iter().enumerate() {
            let reduced = cpt.reduce_to_evidence(&query.evidence)?;
            if reduced.is_scalar() {
                constant *= reduced.total();
            } else {
                active.insert(id, reduced);
            }
        }
        let mut next_id = self.cpts.len();

        let order = self.elimination_order(query, &active)?;
        debug!("{}: eliminating {:?}", query, order);

        for variable in &order {
            let ids: Vec<usize> = active
                .iter()
                .filter(|(_, factor)| factor.contains(variable))
                .map(|(&id, _)| id)
                .collect();
            let mut product: Option<Factor> = None;
            for id in ids {
                let Some(factor) = active.remove(&id) else {
                    continue;
                };
                product = Some(match product {
                    None => factor,
                    Some(acc) => acc.multiply(&factor)?,
                });
            }
            let Some(product) = product else {
                continue;
            };
            let summed = product.sum_out(variable)?;
            trace!(
                "eliminated {} through a table of {} cells, left {:?}",
                variable,
                product.len(),
                summed.variable_names()
            );
            if summed.is_scalar() {
                constant *= summed.total();
            } else {
                active.insert(next_id, summed);
                next_id += 1;
            }
        }

        let mut result = Factor::constant(constant);
        for factor in active.values() {
            result = result.multiply(factor)?;
        }
        let targets: Vec<&str> = query.targets.iter().map(String::as_str).collect();
        result.permuted(&targets)?.normalize()
    }

    fn validate(&self, query: &Query) -> Result<()> {
        if query.targets.is_empty() {
            return Err(NetworkError::InvalidQuery(
                "at least one target variable is required".to_string(),
            ));
        }
        for (i, target) in query.targets.iter().enumerate() {
            if query.targets[..i].contains(target) {
                return Err(NetworkError::InvalidQuery(format!(
                    "target '{}' is listed twice",
                    target
                )));
            }
            if !self.structure.contains(target) {
                return Err(NetworkError::UnknownVariable(target.clone()));
            }
        }
        for (name, state) in &query.evidence {
            if !self.structure.contains(name) {
                return Err(NetworkError::UnknownVariable(name.clone()));
            }
            if query.targets.contains(name) {
                return Err(NetworkError::InvalidQuery(format!(
                    "'{}' is both a target and evidence",
                    name
                )));
            }
            self.domains.get(name)?.state_index(state)?;
        }
        Ok(())
    }

    fn elimination_order(
        &self,
        query: &Query,
        active: &BTreeMap<usize, Factor>,
    ) -> Result<Vec<String>> {
        let hidden: Vec<&str> = self
            .structure
            .topological_order()
            .into_iter()
            .filter(|v| !query.targets.iter().any(|t| t == v))
            .filter(|v| !query.evidence.contains_key(*v))
            .collect();

        match self.ordering {
            EliminationOrdering::ReverseTopological => {
                Ok(hidden.into_iter().rev().map(String::from).collect())
            }
            EliminationOrdering::MinWeight => self.min_weight_order(hidden, active),
        }
    }

    fn min_weight_order(
        &self,
        mut remaining: Vec<&str>,
        active: &BTreeMap<usize, Factor>,
    ) -> Result<Vec<String>> {
        let mut scopes: Vec<BTreeSet<&str>> = active
            .values()
            .map(|f| f.variable_names().into_iter().collect())
            .collect();
        let mut order = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let mut best: Option<(usize, usize)> = None;
            for (position, candidate) in remaining.iter().enumerate() {
                let merged: BTreeSet<&str> = scopes
                    .iter()
                    .filter(|s| s.contains(candidate))
                    .flat_map(|s| s.iter().copied())
                    .collect();
                let mut weight = 1usize;
                for name in &merged {
                    weight = weight.saturating_mul(self.domains.get(name)?.cardinality());
                }
                if best.is_none_or(|(_, w)| weight < w) {
                    best = Some((position, weight));
                }
            }
            let Some((position, _)) = best else {
                break;
            };
            let chosen = remaining.remove(position);
            let (touched, mut kept): (Vec<_>, Vec<_>) =
                scopes.into_iter().partition(|s| s.contains(chosen));
            let mut merged: BTreeSet<&str> = touched.into_iter().flatten().collect();
            merged.remove(chosen);
            if !merged.is_empty() {
                kept.push(merged);
            }
            scopes = kept;
            order.push(chosen.to_string());
        }
        Ok(order)
    }
}
