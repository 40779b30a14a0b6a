//! Dense discrete factors.
//!
//! A `Factor` keeps its cells in one flat vector in row-major order: the last
//! scope variable varies fastest. The flat index of an assignment is the dot
//! product of the per-variable state indices with the radix strides returned
//! by [`row_major_strides`]. Axis operations borrow the vector as an
//! `ndarray` view.

use super::domain::Variable;
use crate::bayesnet::common::errors::{NetworkError, Result};
use log::trace;
use ndarray::{ArrayViewD, Axis, IxDyn};
use std::collections::BTreeMap;

/// Observed states keyed by variable name.
pub type Evidence = BTreeMap<String, String>;

/// Radix strides for a row-major table of the given shape.
pub fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

/// A non-negative table over an ordered scope of variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    scope: Vec<Variable>,
    values: Vec<f64>,
}

impl Factor {
    /// Create a factor. `values` must hold one finite, non-negative cell per
    /// joint assignment of `scope`, in row-major order.
    pub fn new(scope: Vec<Variable>, values: Vec<f64>) -> Result<Self> {
        for (i, variable) in scope.iter().enumerate() {
            if scope[..i].iter().any(|v| v.name() == variable.name()) {
                return Err(NetworkError::Shape(format!(
                    "variable '{}' appears twice in the scope",
                    variable.name()
                )));
            }
        }
        let size: usize = scope.iter().map(Variable::cardinality).product();
        if values.len() != size {
            return Err(NetworkError::Shape(format!(
                "scope {:?} needs {} cells, got {}",
                scope.iter().map(Variable::name).collect::<Vec<_>>(),
                size,
                values.len()
            )));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(NetworkError::Shape(format!(
                "cell value {} is not a finite non-negative number",
                bad
            )));
        }
        Ok(Factor { scope, values })
    }

    /// A factor with empty scope holding a single weight.
    pub(crate) fn constant(value: f64) -> Self {
        Factor {
            scope: Vec::new(),
            values: vec![value],
        }
    }

    pub fn scope(&self) -> &[Variable] {
        &self.scope
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.scope.iter().map(Variable::name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.axis_of(name).is_some()
    }

    pub fn axis_of(&self, name: &str) -> Option<usize> {
        self.scope.iter().position(|v| v.name() == name)
    }

    pub fn shape(&self) -> Vec<usize> {
        self.scope.iter().map(Variable::cardinality).collect()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_scalar(&self) -> bool {
        self.scope.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Cell at the given per-variable state indices.
    pub fn value(&self, indices: &[usize]) -> Option<f64> {
        if indices.len() != self.scope.len() {
            return None;
        }
        let strides = row_major_strides(&self.shape());
        let mut flat = 0;
        for ((&index, variable), stride) in indices.iter().zip(&self.scope).zip(strides) {
            if index >= variable.cardinality() {
                return None;
            }
            flat += index * stride;
        }
        self.values.get(flat).copied()
    }

    /// Cell for the given state labels, one per scope variable in scope order.
    pub fn probability_of(&self, states: &[&str]) -> Result<f64> {
        if states.len() != self.scope.len() {
            return Err(NetworkError::InvalidQuery(format!(
                "expected {} states, got {}",
                self.scope.len(),
                states.len()
            )));
        }
        let indices = self
            .scope
            .iter()
            .zip(states)
            .map(|(variable, state)| variable.state_index(state))
            .collect::<Result<Vec<_>>>()?;
        self.value(&indices)
            .ok_or_else(|| NetworkError::Shape("assignment out of range".to_string()))
    }

    /// Every joint assignment with its cell, in row-major order.
    pub fn assignments(&self) -> impl Iterator<Item = (Vec<&str>, f64)> + '_ {
        let strides = row_major_strides(&self.shape());
        self.values.iter().enumerate().map(move |(flat, &value)| {
            let states = self
                .scope
                .iter()
                .zip(&strides)
                .map(|(variable, &stride)| {
                    variable.states()[(flat / stride) % variable.cardinality()].as_str()
                })
                .collect();
            (states, value)
        })
    }

    /// Keep only the cells consistent with `evidence` and drop the observed
    /// variables from the scope. Evidence on variables outside the scope is
    /// ignored.
    pub fn reduce_to_evidence(&self, evidence: &Evidence) -> Result<Factor> {
        let mut scope = self.scope.clone();
        let mut values = self.values.clone();
        for (name, state) in evidence {
            let Some(axis) = scope.iter().position(|v| v.name() == name) else {
                continue;
            };
            let index = scope[axis].state_index(state)?;
            let shape: Vec<usize> = scope.iter().map(Variable::cardinality).collect();
            let view = as_view(&shape, &values)?;
            let reduced: Vec<f64> = view.index_axis(Axis(axis), index).iter().copied().collect();
            values = reduced;
            scope.remove(axis);
        }
        trace!(
            "reduced {:?} to {:?}",
            self.variable_names(),
            scope.iter().map(Variable::name).collect::<Vec<_>>()
        );
        Ok(Factor { scope, values })
    }

    /// Factor product. The scope is this factor's scope followed by the
    /// variables only `other` mentions.
    pub fn multiply(&self, other: &Factor) -> Result<Factor> {
        let mut scope = self.scope.clone();
        for variable in &other.scope {
            match scope.iter().find(|v| v.name() == variable.name()) {
                Some(existing) if existing != variable => {
                    return Err(NetworkError::Shape(format!(
                        "variable '{}' has different domains in the two factors",
                        variable.name()
                    )));
                }
                Some(_) => {}
                None => scope.push(variable.clone()),
            }
        }

        let shape: Vec<usize> = scope.iter().map(Variable::cardinality).collect();
        let size: usize = shape.iter().product();
        let left = self.strides_within(&scope);
        let right = other.strides_within(&scope);

        let mut values = Vec::with_capacity(size);
        let mut counter = vec![0usize; shape.len()];
        let (mut l, mut r) = (0usize, 0usize);
        for _ in 0..size {
            values.push(self.values[l] * other.values[r]);
            for axis in (0..shape.len()).rev() {
                counter[axis] += 1;
                l += left[axis];
                r += right[axis];
                if counter[axis] < shape[axis] {
                    break;
                }
                l -= left[axis] * shape[axis];
                r -= right[axis] * shape[axis];
                counter[axis] = 0;
            }
        }
        trace!(
            "multiplied {:?} x {:?} into {} cells",
            self.variable_names(),
            other.variable_names(),
            size
        );
        Ok(Factor { scope, values })
    }

    /// Marginalize `name` away.
    pub fn sum_out(&self, name: &str) -> Result<Factor> {
        let axis = self
            .axis_of(name)
            .ok_or_else(|| NetworkError::UnknownVariable(name.to_string()))?;
        let view = as_view(&self.shape(), &self.values)?;
        let values: Vec<f64> = view.sum_axis(Axis(axis)).iter().copied().collect();
        let mut scope = self.scope.clone();
        scope.remove(axis);
        Ok(Factor { scope, values })
    }

    /// Divide every cell by the total mass.
    pub fn normalize(&self) -> Result<Factor> {
        let total = self.total();
        if total == 0.0 {
            return Err(NetworkError::ZeroMass);
        }
        Ok(Factor {
            scope: self.scope.clone(),
            values: self.values.iter().map(|v| v / total).collect(),
        })
    }

    /// Same table with the axes rearranged into `order`.
    pub fn permuted(&self, order: &[&str]) -> Result<Factor> {
        if order.len() != self.scope.len() {
            return Err(NetworkError::Shape(format!(
                "cannot arrange {:?} as {:?}",
                self.variable_names(),
                order
            )));
        }
        let axes = order
            .iter()
            .map(|name| {
                self.axis_of(name)
                    .ok_or_else(|| NetworkError::UnknownVariable(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        let mut sorted = axes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != axes.len() {
            return Err(NetworkError::Shape(format!("repeated axis in {:?}", order)));
        }

        let view = as_view(&self.shape(), &self.values)?;
        let values: Vec<f64> = view.permuted_axes(IxDyn(&axes)).iter().copied().collect();
        let scope = axes.iter().map(|&axis| self.scope[axis].clone()).collect();
        Ok(Factor { scope, values })
    }

    /// Sum over the first scope variable for each assignment of the rest.
    ///
    /// For a CPT laid out as `[node, parents..]` every entry is 1.
    pub fn conditional_sums(&self) -> Result<Vec<f64>> {
        if self.scope.is_empty() {
            return Ok(vec![self.total()]);
        }
        let view = as_view(&self.shape(), &self.values)?;
        Ok(view.sum_axis(Axis(0)).iter().copied().collect())
    }

    fn strides_within(&self, scope: &[Variable]) -> Vec<usize> {
        let own = row_major_strides(&self.shape());
        scope
            .iter()
            .map(|v| self.axis_of(v.name()).map_or(0, |axis| own[axis]))
            .collect()
    }
}

fn as_view<'a>(shape: &[usize], values: &'a [f64]) -> Result<ArrayViewD<'a, f64>> {
    ArrayViewD::from_shape(IxDyn(shape), values).map_err(|e| NetworkError::Shape(e.to_string()))
}
