use std::time::Instant;

use itertools::Itertools;

use super::{
    bound_propagation::propagate_rows, IntegerProgram, SolveBudget, VariableBounds,
    FEASIBILITY_TOLERANCE,
};
use crate::optimize::OptimizerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    /// the search tree was exhausted and the incumbent is optimal
    Optimal,
    /// the budget ran out with an incumbent in hand
    Feasible,
    /// the search tree was exhausted without finding a solution
    Infeasible,
    /// the budget ran out before any solution was found
    BudgetExhausted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub solution: Option<Vec<i64>>,
    pub objective: Option<f64>,
    /// search nodes explored
    pub nodes: u64,
}

/// depth-first branch and bound. each node is bound-propagated, pruned against the
/// incumbent using the separable lower bound of the objective over the node's domain, and
/// branched on its first unfixed variable: first fixed to the value the objective prefers,
/// then with that value excluded.
pub fn solve(program: &IntegerProgram, budget: &SolveBudget) -> Result<SolveOutcome, OptimizerError> {
    program.validate()?;
    let rows = program
        .constraints()
        .iter()
        .flat_map(|c| c.as_less_equal_rows())
        .collect_vec();
    let started = Instant::now();
    let mut stack = vec![VariableBounds::from_program(program)];
    let mut incumbent: Option<(Vec<i64>, f64)> = None;
    let mut nodes: u64 = 0;
    let mut exhausted = false;

    while let Some(mut node) = stack.pop() {
        if budget.is_exhausted(nodes, &started) {
            exhausted = true;
            break;
        }
        nodes += 1;
        if !propagate_rows(&rows, &mut node) {
            continue;
        }
        if let Some((_, best)) = &incumbent {
            if objective_lower_bound(program, &node) >= best - FEASIBILITY_TOLERANCE {
                continue;
            }
        }
        match node.first_unfixed() {
            None => {
                let values = node.lower;
                if !program.is_feasible(&values) {
                    continue;
                }
                let objective = program.evaluate(&values);
                let improves = incumbent
                    .as_ref()
                    .map(|(_, best)| objective < best - FEASIBILITY_TOLERANCE)
                    .unwrap_or(true);
                if improves {
                    log::debug!("new incumbent with objective {objective} after {nodes} nodes");
                    incumbent = Some((values, objective));
                }
            }
            Some(var) => {
                let prefer_lower = program.objective()[var] >= 0.0;
                let (fixed, rest) = node.split_on(var, prefer_lower);
                stack.push(rest);
                stack.push(fixed);
            }
        }
    }

    let status = match (&incumbent, exhausted) {
        (Some(_), false) => SolveStatus::Optimal,
        (Some(_), true) => SolveStatus::Feasible,
        (None, false) => SolveStatus::Infeasible,
        (None, true) => SolveStatus::BudgetExhausted,
    };
    log::debug!(
        "branch and bound finished with {status:?} after {nodes} nodes in {:?}",
        started.elapsed()
    );
    let (solution, objective) = match incumbent {
        Some((values, objective)) => (Some(values), Some(objective)),
        None => (None, None),
    };
    Ok(SolveOutcome {
        status,
        solution,
        objective,
        nodes,
    })
}

/// smallest objective value any point in the node's domain can reach, ignoring constraints.
fn objective_lower_bound(program: &IntegerProgram, bounds: &VariableBounds) -> f64 {
    program.objective_offset()
        + program
            .objective()
            .iter()
            .enumerate()
            .map(|(idx, c)| {
                if *c >= 0.0 {
                    c * bounds.lower[idx] as f64
                } else {
                    c * bounds.upper[idx] as f64
                }
            })
            .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::integer_program::LinearConstraint;

    /// maximize 5a + 4b (minimize the negation) subject to 6a + 4b <= 24, a + 2b <= 6.
    /// the LP optimum is fractional (a = 3, b = 1.5); the integer optimum is a = 4, b = 0.
    fn knapsack() -> IntegerProgram {
        let mut ip = IntegerProgram::new();
        let a = ip.add_variable(0, 10, -5.0);
        let b = ip.add_variable(0, 10, -4.0);
        ip.add_constraint(LinearConstraint::less_equal(vec![(a, 6.0), (b, 4.0)], 24.0))
            .expect("test invariant failed: constraint should be accepted");
        ip.add_constraint(LinearConstraint::less_equal(vec![(a, 1.0), (b, 2.0)], 6.0))
            .expect("test invariant failed: constraint should be accepted");
        ip
    }

    #[test]
    fn test_solves_to_integer_optimum() {
        let outcome = solve(&knapsack(), &SolveBudget::unlimited())
            .expect("test invariant failed: program should be valid");
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.objective, Some(-20.0));
        let solution = outcome.solution.expect("test invariant failed: should have a solution");
        assert!(knapsack().is_feasible(&solution));
    }

    #[test]
    fn test_matches_enumeration() {
        let ip = knapsack();
        let best = (0..=10)
            .cartesian_product(0..=10)
            .map(|(a, b)| vec![a, b])
            .filter(|v| ip.is_feasible(v))
            .map(|v| ip.evaluate(&v))
            .fold(f64::INFINITY, f64::min);
        let outcome = solve(&ip, &SolveBudget::unlimited())
            .expect("test invariant failed: program should be valid");
        assert_eq!(outcome.objective, Some(best));
    }

    #[test]
    fn test_proves_infeasibility() {
        let mut ip = IntegerProgram::new();
        let x = ip.add_variable(0, 3, 1.0);
        ip.add_constraint(LinearConstraint::greater_equal(vec![(x, 2.0)], 7.0))
            .expect("test invariant failed: constraint should be accepted");
        let outcome = solve(&ip, &SolveBudget::unlimited())
            .expect("test invariant failed: program should be valid");
        assert_eq!(outcome.status, SolveStatus::Infeasible);
        assert!(outcome.solution.is_none());
    }

    #[test]
    fn test_zero_node_budget() {
        let budget = SolveBudget {
            node_limit: Some(0),
            time_limit: None,
        };
        let outcome = solve(&knapsack(), &budget).expect("test invariant failed: program should be valid");
        assert_eq!(outcome.status, SolveStatus::BudgetExhausted);
        assert_eq!(outcome.nodes, 0);
    }

    #[test]
    fn test_partial_budget_keeps_incumbent() {
        // the first dive reaches a leaf, so a small budget still yields a solution
        let budget = SolveBudget {
            node_limit: Some(4),
            time_limit: None,
        };
        let outcome = solve(&knapsack(), &budget).expect("test invariant failed: program should be valid");
        assert!(matches!(
            outcome.status,
            SolveStatus::Feasible | SolveStatus::Optimal
        ));
        let solution = outcome.solution.expect("test invariant failed: should have a solution");
        assert!(knapsack().is_feasible(&solution));
    }
}
