//! turns a demand forecast into a per-slot train allocation. the allocation is posed as a
//! small integer program and solved either exactly by branch and bound or approximately by
//! a seeded genetic search.
mod allocation_plan;
mod allocation_request;
mod allocation_solver;
mod genetic_allocator;
mod ip_allocator;
mod optimizer_config;
mod optimizer_error;

pub mod integer_program;

pub use allocation_plan::{allocation_objective, satisfies_request, AllocationPlan, InfeasibleReason, PlanStatus};
pub use allocation_request::{coverage_floors, AllocationConstraints, AllocationRequest, SlotOverride};
pub use allocation_solver::AllocationSolver;
pub use genetic_allocator::GeneticAllocator;
pub use ip_allocator::IntegerProgramAllocator;
pub use optimizer_config::{OptimizerConfig, OptimizerType};
pub use optimizer_error::OptimizerError;
