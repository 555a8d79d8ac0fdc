use serde::{Deserialize, Serialize};

use super::FEASIBILITY_TOLERANCE;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

/// `sum(coefficient * x[variable]) <sense> rhs`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LinearConstraint {
    pub terms: Vec<(usize, f64)>,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn new(terms: Vec<(usize, f64)>, sense: ConstraintSense, rhs: f64) -> LinearConstraint {
        LinearConstraint { terms, sense, rhs }
    }

    pub fn less_equal(terms: Vec<(usize, f64)>, rhs: f64) -> LinearConstraint {
        LinearConstraint::new(terms, ConstraintSense::LessEqual, rhs)
    }

    pub fn greater_equal(terms: Vec<(usize, f64)>, rhs: f64) -> LinearConstraint {
        LinearConstraint::new(terms, ConstraintSense::GreaterEqual, rhs)
    }

    pub fn activity(&self, values: &[i64]) -> f64 {
        self.terms
            .iter()
            .map(|(idx, coef)| coef * values[*idx] as f64)
            .sum()
    }

    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        let activity = self.activity(values);
        match self.sense {
            ConstraintSense::LessEqual => activity <= self.rhs + FEASIBILITY_TOLERANCE,
            ConstraintSense::GreaterEqual => activity >= self.rhs - FEASIBILITY_TOLERANCE,
            ConstraintSense::Equal => (activity - self.rhs).abs() <= FEASIBILITY_TOLERANCE,
        }
    }

    /// the constraint rewritten as one or two `<=` rows.
    pub fn as_less_equal_rows(&self) -> Vec<(Vec<(usize, f64)>, f64)> {
        let negated = || {
            (
                self.terms.iter().map(|(i, c)| (*i, -c)).collect::<Vec<_>>(),
                -self.rhs,
            )
        };
        match self.sense {
            ConstraintSense::LessEqual => vec![(self.terms.clone(), self.rhs)],
            ConstraintSense::GreaterEqual => vec![negated()],
            ConstraintSense::Equal => vec![(self.terms.clone(), self.rhs), negated()],
        }
    }
}
