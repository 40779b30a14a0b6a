use crate::bayesnet::common::errors::{NetworkError, Result};
use crate::data::Dataset;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A named variable with a fixed, ordered, finite set of state labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    states: Vec<String>,
}

impl Variable {
    /// Create a variable. States keep the given order and must be unique.
    pub fn new(name: impl Into<String>, states: Vec<String>) -> Result<Self> {
        let name = name.into();
        if states.is_empty() {
            return Err(NetworkError::Domain(format!(
                "variable '{}' has no states",
                name
            )));
        }
        let unique: BTreeSet<&String> = states.iter().collect();
        if unique.len() != states.len() {
            return Err(NetworkError::Domain(format!(
                "variable '{}' declares a state twice",
                name
            )));
        }
        Ok(Variable { name, states })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn cardinality(&self) -> usize {
        self.states.len()
    }

    /// Position of `state` in this variable's domain.
    pub fn state_index(&self, state: &str) -> Result<usize> {
        self.states
            .iter()
            .position(|s| s == state)
            .ok_or_else(|| NetworkError::UnknownState {
                variable: self.name.clone(),
                state: state.to_string(),
            })
    }

    pub fn state(&self, index: usize) -> Option<&str> {
        self.states.get(index).map(|s| s.as_str())
    }
}

/// Maps each variable name to its domain.
///
/// Domains derived from data are sorted lexicographically, so a binary
/// `"0"`/`"1"` column always puts `"1"` at index 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainRegistry {
    variables: BTreeMap<String, Variable>,
}

impl DomainRegistry {
    /// Scan the columns named in `required` and collect their distinct labels.
    ///
    /// Blank cells count as missing observations and do not contribute a state.
    pub fn from_dataset<'a, I>(data: &Dataset, required: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut variables = BTreeMap::new();
        for name in required {
            let column = data.column_index(name).ok_or_else(|| {
                NetworkError::Domain(format!("column '{}' is missing from the data", name))
            })?;
            let states: BTreeSet<&str> = data
                .rows()
                .iter()
                .map(|row| row[column].as_str())
                .filter(|cell| !cell.is_empty())
                .collect();
            if states.is_empty() {
                return Err(NetworkError::Domain(format!(
                    "column '{}' has no observed states",
                    name
                )));
            }
            trace!("domain of {}: {:?}", name, states);
            let variable = Variable::new(name, states.into_iter().map(String::from).collect())?;
            variables.insert(name.to_string(), variable);
        }
        debug!("derived {} domains from {} rows", variables.len(), data.len());
        Ok(DomainRegistry { variables })
    }

    /// Build a registry from variables whose domains are known ahead of the data.
    pub fn declare<I>(variables: I) -> Result<Self>
    where
        I: IntoIterator<Item = Variable>,
    {
        let mut registry = BTreeMap::new();
        for variable in variables {
            let name = variable.name().to_string();
            if registry.insert(name.clone(), variable).is_some() {
                return Err(NetworkError::Domain(format!(
                    "variable '{}' declared twice",
                    name
                )));
            }
        }
        Ok(DomainRegistry {
            variables: registry,
        })
    }

    pub fn get(&self, name: &str) -> Result<&Variable> {
        self.variables
            .get(name)
            .ok_or_else(|| NetworkError::UnknownVariable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
