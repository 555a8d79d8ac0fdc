use itertools::Itertools;

use super::{IntegerProgram, FEASIBILITY_TOLERANCE};

/// passes over the constraint rows before propagation gives up on reaching a fixed point.
const MAX_PROPAGATION_ROUNDS: usize = 100;

/// a constraint in `terms <= rhs` form.
pub(super) type LessEqualRow = (Vec<(usize, f64)>, f64);

/// the current domain of every variable in a search node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableBounds {
    pub lower: Vec<i64>,
    pub upper: Vec<i64>,
}

impl VariableBounds {
    pub fn from_program(program: &IntegerProgram) -> VariableBounds {
        let (lower, upper) = program
            .variables()
            .iter()
            .map(|v| (v.lower, v.upper))
            .unzip();
        VariableBounds { lower, upper }
    }

    pub fn has_empty_domain(&self) -> bool {
        self.lower.iter().zip(self.upper.iter()).any(|(lo, hi)| lo > hi)
    }

    pub fn first_unfixed(&self) -> Option<usize> {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .position(|(lo, hi)| lo < hi)
    }

    /// splits the domain of `var` into the single preferred value and the remainder.
    pub fn split_on(&self, var: usize, prefer_lower: bool) -> (VariableBounds, VariableBounds) {
        let mut fixed = self.clone();
        let mut rest = self.clone();
        if prefer_lower {
            fixed.upper[var] = self.lower[var];
            rest.lower[var] = self.lower[var] + 1;
        } else {
            fixed.lower[var] = self.upper[var];
            rest.upper[var] = self.upper[var] - 1;
        }
        (fixed, rest)
    }
}

/// tightens variable bounds against every constraint until nothing changes. returns false
/// if some constraint cannot be satisfied within the bounds.
pub fn propagate(program: &IntegerProgram, bounds: &mut VariableBounds) -> bool {
    let rows = program
        .constraints()
        .iter()
        .flat_map(|c| c.as_less_equal_rows())
        .collect_vec();
    propagate_rows(&rows, bounds)
}

pub(super) fn propagate_rows(rows: &[LessEqualRow], bounds: &mut VariableBounds) -> bool {
    if bounds.has_empty_domain() {
        return false;
    }
    for _ in 0..MAX_PROPAGATION_ROUNDS {
        let mut changed = false;
        for (terms, rhs) in rows.iter() {
            let term_minimums = terms
                .iter()
                .map(|(idx, coef)| term_minimum(*coef, bounds.lower[*idx], bounds.upper[*idx]))
                .collect_vec();
            let min_activity: f64 = term_minimums.iter().sum();
            if min_activity > rhs + FEASIBILITY_TOLERANCE {
                return false;
            }
            for ((idx, coef), term_min) in terms.iter().zip(term_minimums.iter()) {
                if *coef == 0.0 {
                    continue;
                }
                let residual = rhs - (min_activity - term_min);
                if *coef > 0.0 {
                    let cap = (residual / coef + FEASIBILITY_TOLERANCE).floor();
                    if cap < bounds.upper[*idx] as f64 {
                        bounds.upper[*idx] = cap as i64;
                        changed = true;
                    }
                } else {
                    let floor = (residual / coef - FEASIBILITY_TOLERANCE).ceil();
                    if floor > bounds.lower[*idx] as f64 {
                        bounds.lower[*idx] = floor as i64;
                        changed = true;
                    }
                }
                if bounds.lower[*idx] > bounds.upper[*idx] {
                    return false;
                }
            }
        }
        if !changed {
            break;
        }
    }
    true
}

fn term_minimum(coef: f64, lower: i64, upper: i64) -> f64 {
    if coef >= 0.0 {
        coef * lower as f64
    } else {
        coef * upper as f64
    }
}
