use crate::bayesnet::common::errors::Result;
use crate::bayesnet::model::factor::{Evidence, Factor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target variables plus an evidence assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub targets: Vec<String>,
    pub evidence: Evidence,
}

impl Query {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query {
            targets: targets.into_iter().map(Into::into).collect(),
            evidence: Evidence::new(),
        }
    }

    /// Add one observed state.
    pub fn given(mut self, variable: impl Into<String>, state: impl Into<String>) -> Self {
        self.evidence.insert(variable.into(), state.into());
        self
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence.extend(evidence);
        self
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P({}", self.targets.join(", "))?;
        if !self.evidence.is_empty() {
            let given: Vec<String> = self
                .evidence
                .iter()
                .map(|(name, state)| format!("{}={}", name, state))
                .collect();
            write!(f, " | {}", given.join(", "))?;
        }
        write!(f, ")")
    }
}

/// Normalized distribution over a query's targets, axes in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct Posterior {
    factor: Factor,
}

impl Posterior {
    pub(crate) fn new(factor: Factor) -> Self {
        Posterior { factor }
    }

    pub fn targets(&self) -> Vec<&str> {
        self.factor.variable_names()
    }

    pub fn factor(&self) -> &Factor {
        &self.factor
    }

    pub fn values(&self) -> &[f64] {
        self.factor.values()
    }

    /// Probability of one state per target, in target order.
    pub fn probability(&self, states: &[&str]) -> Result<f64> {
        self.factor.probability_of(states)
    }

    /// `(state tuple, probability)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<&str>, f64)> + '_ {
        self.factor.assignments()
    }

    /// The most probable state tuple; the first one wins a tie.
    pub fn most_likely(&self) -> Option<(Vec<&str>, f64)> {
        self.iter()
            .reduce(|best, next| if next.1 > best.1 { next } else { best })
    }
}
