use serde::{Deserialize, Serialize};

use super::AllocationRequest;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InfeasibleReason {
    /// search proved that no allocation satisfies the constraints
    Constraints,
    /// the node or time budget ran out before any allocation was found
    Budget,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Optimal,
    Feasible,
    Infeasible(InfeasibleReason),
}

impl PlanStatus {
    pub fn is_feasible(&self) -> bool {
        !matches!(self, PlanStatus::Infeasible(_))
    }
}

/// trains to run per slot. an infeasible plan has no allocations.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AllocationPlan {
    pub allocations: Vec<u32>,
    pub status: PlanStatus,
    /// unused passenger capacity over the horizon, sum of (trains * capacity - forecast)
    pub objective: Option<f64>,
    /// fleet_size * slots minus the allocated train-hours
    pub unused_train_hours: Option<u64>,
    /// coverage floors the plan was solved against
    pub floors: Vec<u32>,
}

impl AllocationPlan {
    pub fn solved(allocations: Vec<u32>, status: PlanStatus, request: &AllocationRequest) -> AllocationPlan {
        let objective = allocation_objective(&allocations, request);
        let available = request.fleet_size as u64 * request.slots() as u64;
        let used: u64 = allocations.iter().map(|x| *x as u64).sum();
        AllocationPlan {
            allocations,
            status,
            objective: Some(objective),
            unused_train_hours: Some(available.saturating_sub(used)),
            floors: request.coverage_floors(),
        }
    }

    pub fn infeasible(reason: InfeasibleReason, request: &AllocationRequest) -> AllocationPlan {
        AllocationPlan {
            allocations: vec![],
            status: PlanStatus::Infeasible(reason),
            objective: None,
            unused_train_hours: None,
            floors: request.coverage_floors(),
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.status.is_feasible()
    }
}

/// unused capacity of an allocation: sum over slots of (trains * slot capacity - forecast).
pub fn allocation_objective(allocations: &[u32], request: &AllocationRequest) -> f64 {
    allocations
        .iter()
        .zip(request.forecast.iter())
        .map(|(x, f)| *x as f64 * request.slot_capacity - f)
        .sum()
}

/// true if the allocation covers every slot's floor and respects every slot bound and the
/// fleet's train-hour budget.
pub fn satisfies_request(allocations: &[u32], request: &AllocationRequest) -> bool {
    if allocations.len() != request.slots() {
        return false;
    }
    let within_slots = allocations
        .iter()
        .zip(request.coverage_floors())
        .zip(request.slot_bounds())
        .all(|((x, floor), (lower, upper))| *x >= floor && *x >= lower && *x <= upper);
    let total: u64 = allocations.iter().map(|x| *x as u64).sum();
    within_slots && total <= request.fleet_size as u64 * request.slots() as u64
}
