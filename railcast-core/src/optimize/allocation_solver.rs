use super::{AllocationPlan, AllocationRequest, OptimizerError};

/// a strategy for turning an [`AllocationRequest`] into an [`AllocationPlan`].
/// infeasibility is reported through the plan status, errors are reserved for
/// requests that fail validation.
pub trait AllocationSolver: Send + Sync {
    fn name(&self) -> String;
    fn allocate(&self, request: &AllocationRequest) -> Result<AllocationPlan, OptimizerError>;
}
