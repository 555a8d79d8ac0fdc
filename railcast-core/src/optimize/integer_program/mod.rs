//! a small, general integer program over bounded integer variables with linear
//! constraints and a linear objective to minimize, solved by depth-first branch and bound.
mod bound_propagation;
mod branch_and_bound;
mod linear_constraint;
mod program;
mod solve_budget;

pub use bound_propagation::{propagate, VariableBounds};
pub use branch_and_bound::{solve, SolveOutcome, SolveStatus};
pub use linear_constraint::{ConstraintSense, LinearConstraint};
pub use program::{IntegerProgram, IntegerVariable};
pub use solve_budget::SolveBudget;

/// slack allowed when comparing floating point activities against right hand sides.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-9;
