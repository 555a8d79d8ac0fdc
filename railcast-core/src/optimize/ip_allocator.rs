use itertools::Itertools;

use super::{
    integer_program::{self, IntegerProgram, LinearConstraint, SolveBudget, SolveStatus},
    AllocationPlan, AllocationRequest, AllocationSolver, InfeasibleReason, OptimizerError,
    PlanStatus,
};

/// exact allocation by branch and bound over one integer variable per slot.
#[derive(Clone, Debug, Default)]
pub struct IntegerProgramAllocator {
    budget: SolveBudget,
}

impl IntegerProgramAllocator {
    pub fn new(budget: SolveBudget) -> IntegerProgramAllocator {
        IntegerProgramAllocator { budget }
    }

    /// the allocation integer program for a request:
    ///   minimize   sum_h (C * x[h]) - sum_h forecast[h]
    ///   subject to x[h] >= floor[h]             (coverage)
    ///              sum_h x[h] <= fleet * slots  (fleet train-hours)
    ///              lower[h] <= x[h] <= upper[h] (fleet size and operator bounds)
    pub fn build_program(request: &AllocationRequest) -> Result<IntegerProgram, OptimizerError> {
        let mut program = IntegerProgram::new();
        let variables = request
            .slot_bounds()
            .into_iter()
            .map(|(lower, upper)| program.add_variable(lower as i64, upper as i64, request.slot_capacity))
            .collect_vec();
        program.set_objective_offset(-request.forecast.iter().sum::<f64>());
        for (x, floor) in variables.iter().zip(request.coverage_floors()) {
            program.add_constraint(LinearConstraint::greater_equal(vec![(*x, 1.0)], floor as f64))?;
        }
        let fleet_hours = request.fleet_size as f64 * request.slots() as f64;
        let all_slots = variables.iter().map(|x| (*x, 1.0)).collect_vec();
        program.add_constraint(LinearConstraint::less_equal(all_slots, fleet_hours))?;
        Ok(program)
    }
}

impl AllocationSolver for IntegerProgramAllocator {
    fn name(&self) -> String {
        String::from("integer_program")
    }

    fn allocate(&self, request: &AllocationRequest) -> Result<AllocationPlan, OptimizerError> {
        request.validate()?;
        let program = IntegerProgramAllocator::build_program(request)?;
        let outcome = integer_program::solve(&program, &self.budget)?;
        log::info!(
            "integer program over {} slots finished as {:?} after {} nodes",
            request.slots(),
            outcome.status,
            outcome.nodes
        );
        let status = match outcome.status {
            SolveStatus::Optimal => PlanStatus::Optimal,
            SolveStatus::Feasible => PlanStatus::Feasible,
            SolveStatus::Infeasible => {
                return Ok(AllocationPlan::infeasible(InfeasibleReason::Constraints, request))
            }
            SolveStatus::BudgetExhausted => {
                return Ok(AllocationPlan::infeasible(InfeasibleReason::Budget, request))
            }
        };
        let allocations = outcome
            .solution
            .unwrap_or_default()
            .into_iter()
            .map(|x| x.max(0) as u32)
            .collect_vec();
        Ok(AllocationPlan::solved(allocations, status, request))
    }
}
