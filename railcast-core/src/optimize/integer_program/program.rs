use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::LinearConstraint;
use crate::optimize::OptimizerError;

/// an integer decision variable with inclusive bounds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntegerVariable {
    pub lower: i64,
    pub upper: i64,
}

/// minimize `objective · x + objective_offset` subject to the linear constraints and
/// the variable bounds, with every x integral.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct IntegerProgram {
    variables: Vec<IntegerVariable>,
    constraints: Vec<LinearConstraint>,
    objective: Vec<f64>,
    objective_offset: f64,
}

impl IntegerProgram {
    pub fn new() -> IntegerProgram {
        IntegerProgram::default()
    }

    /// adds a variable and returns its index.
    pub fn add_variable(&mut self, lower: i64, upper: i64, objective: f64) -> usize {
        self.variables.push(IntegerVariable { lower, upper });
        self.objective.push(objective);
        self.variables.len() - 1
    }

    pub fn add_constraint(&mut self, constraint: LinearConstraint) -> Result<(), OptimizerError> {
        if let Some((idx, _)) = constraint
            .terms
            .iter()
            .find(|(idx, _)| *idx >= self.variables.len())
        {
            return Err(OptimizerError::InvalidProgram(format!(
                "constraint references variable {idx} but the program has {} variables",
                self.variables.len()
            )));
        }
        if !constraint.rhs.is_finite() || constraint.terms.iter().any(|(_, c)| !c.is_finite()) {
            return Err(OptimizerError::InvalidProgram(String::from(
                "constraint coefficients and right hand side must be finite",
            )));
        }
        self.constraints.push(constraint);
        Ok(())
    }

    pub fn set_objective_offset(&mut self, offset: f64) {
        self.objective_offset = offset;
    }

    pub fn variables(&self) -> &[IntegerVariable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn objective_offset(&self) -> f64 {
        self.objective_offset
    }

    pub fn n_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn evaluate(&self, values: &[i64]) -> f64 {
        self.objective_offset
            + self
                .objective
                .iter()
                .zip(values.iter())
                .map(|(c, x)| c * *x as f64)
                .sum::<f64>()
    }

    pub fn is_feasible(&self, values: &[i64]) -> bool {
        values.len() == self.variables.len()
            && self
                .variables
                .iter()
                .zip(values.iter())
                .all(|(v, x)| v.lower <= *x && *x <= v.upper)
            && self.constraints.iter().all(|c| c.is_satisfied(values))
    }

    /// variables whose objective coefficient is not finite make the program unsolvable.
    pub fn validate(&self) -> Result<(), OptimizerError> {
        let bad = self
            .objective
            .iter()
            .positions(|c| !c.is_finite())
            .collect_vec();
        if !bad.is_empty() || !self.objective_offset.is_finite() {
            return Err(OptimizerError::InvalidProgram(format!(
                "objective has non-finite coefficients at variables [{}]",
                bad.iter().join(", ")
            )));
        }
        Ok(())
    }
}
