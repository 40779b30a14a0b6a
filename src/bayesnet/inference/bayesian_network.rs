use super::elimination::{EliminationOrdering, VariableElimination};
use super::query::{Posterior, Query};
use crate::bayesnet::common::errors::{NetworkError, Result};
use crate::bayesnet::model::ModelFile;
use crate::bayesnet::model::domain::DomainRegistry;
use crate::bayesnet::model::estimator::{UnseenParentPolicy, estimate};
use crate::bayesnet::model::factor::Factor;
use crate::bayesnet::model::structure::Structure;
use crate::data::Dataset;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

/// Tolerance used when checking that loaded CPT columns sum to one.
const CPT_TOLERANCE: f64 = 1e-6;

/// Choices made once, at estimation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitConfig {
    pub unseen_parents: UnseenParentPolicy,
    pub ordering: EliminationOrdering,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            unseen_parents: UnseenParentPolicy::Uniform,
            ordering: EliminationOrdering::ReverseTopological,
        }
    }
}

#[derive(Debug)]
struct FittedParameters {
    domains: DomainRegistry,
    /// One CPT per node, in `Structure::nodes()` order
    cpts: Vec<Factor>,
}

/// BayesianNetwork is the entry point for fitting and querying.
///
/// A network starts unfitted (structure only). [`BayesianNetwork::fit`]
/// returns a new, fitted network and leaves the receiver untouched, so a
/// fitted network never changes and can be queried from many threads.
#[derive(Debug, Clone)]
pub struct BayesianNetwork {
    structure: Arc<Structure>,
    fitted: Option<Arc<FittedParameters>>,
    ordering: EliminationOrdering,
}

impl BayesianNetwork {
    /// An unfitted network over `structure`.
    pub fn new(structure: Structure) -> Self {
        BayesianNetwork {
            structure: Arc::new(structure),
            fitted: None,
            ordering: EliminationOrdering::default(),
        }
    }

    pub fn from_edges<S: AsRef<str>>(edges: &[(S, S)]) -> Result<Self> {
        Ok(Self::new(Structure::from_edges(edges)?))
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn ordering(&self) -> EliminationOrdering {
        self.ordering
    }

    /// Same parameters, different elimination rule.
    pub fn with_ordering(&self, ordering: EliminationOrdering) -> Self {
        BayesianNetwork {
            structure: Arc::clone(&self.structure),
            fitted: self.fitted.clone(),
            ordering,
        }
    }

    /// Derive domains from `data` and estimate every CPT.
    pub fn fit(&self, data: &Dataset, config: &FitConfig) -> Result<Self> {
        let domains = DomainRegistry::from_dataset(data, self.structure.nodes())?;
        self.fit_with_domains(domains, data, config)
    }

    /// Estimate every CPT against domains declared by the caller.
    pub fn fit_with_domains(
        &self,
        domains: DomainRegistry,
        data: &Dataset,
        config: &FitConfig,
    ) -> Result<Self> {
        let cpts = estimate(&self.structure, &domains, data, config.unseen_parents)?;
        info!("fitted {} CPTs", cpts.len());
        Ok(BayesianNetwork {
            structure: Arc::clone(&self.structure),
            fitted: Some(Arc::new(FittedParameters { domains, cpts })),
            ordering: config.ordering,
        })
    }

    /// Assemble a fitted network from CPTs computed elsewhere.
    ///
    /// Each node needs exactly one CPT with scope `[node, parents..]`, using
    /// the registry's domains, and every column must sum to one.
    pub fn from_parameters(
        structure: Structure,
        domains: DomainRegistry,
        cpts: Vec<Factor>,
    ) -> Result<Self> {
        let mut pool = cpts;
        let mut ordered = Vec::with_capacity(structure.node_count());
        for node in structure.nodes() {
            let position = pool
                .iter()
                .position(|cpt| cpt.variable_names().first() == Some(&node))
                .ok_or_else(|| NetworkError::Shape(format!("no CPT for node '{}'", node)))?;
            let cpt = pool.swap_remove(position);

            let mut expected = vec![node];
            expected.extend(structure.parents_of(node)?);
            if cpt.variable_names() != expected {
                return Err(NetworkError::Shape(format!(
                    "CPT for '{}' has scope {:?}, expected {:?}",
                    node,
                    cpt.variable_names(),
                    expected
                )));
            }
            for variable in cpt.scope() {
                if domains.get(variable.name())? != variable {
                    return Err(NetworkError::Shape(format!(
                        "CPT for '{}' disagrees with the domain of '{}'",
                        node,
                        variable.name()
                    )));
                }
            }
            if cpt
                .conditional_sums()?
                .iter()
                .any(|sum| (sum - 1.0).abs() > CPT_TOLERANCE)
            {
                return Err(NetworkError::Shape(format!(
                    "CPT for '{}' is not a conditional distribution",
                    node
                )));
            }
            ordered.push(cpt);
        }
        if let Some(extra) = pool.first() {
            return Err(NetworkError::Shape(format!(
                "CPT over {:?} does not belong to any node",
                extra.variable_names()
            )));
        }

        Ok(BayesianNetwork {
            structure: Arc::new(structure),
            fitted: Some(Arc::new(FittedParameters {
                domains,
                cpts: ordered,
            })),
            ordering: EliminationOrdering::default(),
        })
    }

    pub fn domains(&self) -> Result<&DomainRegistry> {
        Ok(&self.fitted()?.domains)
    }

    pub fn cpt(&self, node: &str) -> Result<&Factor> {
        let fitted = self.fitted()?;
        let position = self
            .structure
            .position(node)
            .ok_or_else(|| NetworkError::UnknownVariable(node.to_string()))?;
        Ok(&fitted.cpts[position])
    }

    /// `(node, CPT)` pairs in node declaration order.
    pub fn cpts(&self) -> Result<impl Iterator<Item = (&str, &Factor)>> {
        let fitted = self.fitted()?;
        Ok(self.structure.nodes().zip(fitted.cpts.iter()))
    }

    /// Posterior over `query.targets` given `query.evidence`.
    pub fn query(&self, query: &Query) -> Result<Posterior> {
        let fitted = self.fitted()?;
        let engine =
            VariableElimination::new(&self.structure, &fitted.domains, &fitted.cpts, self.ordering);
        engine.query(query).map(Posterior::new)
    }

    /// Marginal of a single variable with no evidence.
    pub fn marginal(&self, target: &str) -> Result<Posterior> {
        self.query(&Query::new([target]))
    }

    /// Answer independent queries in parallel. Results keep the input order.
    pub fn query_batch(&self, queries: &[Query]) -> Vec<Result<Posterior>> {
        queries.par_iter().map(|query| self.query(query)).collect()
    }

    /// Save structure, domains and CPTs as JSON.
    pub fn save_to_file(&self, path: &str) -> std::result::Result<(), Box<dyn Error>> {
        ModelFile::from_network(self)?.save_to_file(path)
    }

    /// Load a network previously written by [`BayesianNetwork::save_to_file`].
    pub fn from_file(path: &str) -> std::result::Result<Self, Box<dyn Error>> {
        info!("Loading BayesianNetwork from file: {}", path);
        Ok(ModelFile::load_from_file(path)?.into_network()?)
    }

    fn fitted(&self) -> Result<&FittedParameters> {
        self.fitted.as_deref().ok_or(NetworkError::ModelNotFitted)
    }
}
