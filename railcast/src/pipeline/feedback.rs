use itertools::Itertools;
use railcast_core::optimize::{
    AllocationConstraints, AllocationPlan, AllocationRequest, AllocationSolver, OptimizerError,
    PlanStatus, SlotOverride,
};
use serde::{Deserialize, Serialize};

/// decides when realized demand has drifted far enough from the forecast to re-plan.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ReoptimizationTrigger {
    pub threshold: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SlotDeviation {
    pub slot: usize,
    pub forecast: f64,
    pub realized: f64,
    /// |realized - forecast| / forecast. None when the forecast is zero
    pub relative_error: Option<f64>,
}

/// outcome of comparing realized demand against the plan's forecast.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FeedbackReport {
    pub threshold: f64,
    pub triggered: bool,
    pub first_deviation_slot: Option<usize>,
    pub deviations: Vec<SlotDeviation>,
    /// forecast with realized values substituted from the first deviating slot onward
    pub revised_forecast: Vec<f64>,
    /// original allocations up to the first deviation followed by the re-solved remainder
    pub revised_plan: Option<AllocationPlan>,
}

impl ReoptimizationTrigger {
    pub fn new(threshold: f64) -> ReoptimizationTrigger {
        ReoptimizationTrigger { threshold }
    }

    /// true when realized demand differs from the forecast by more than the threshold,
    /// relative to the forecast. a zero forecast deviates whenever any demand is realized.
    pub fn deviates(&self, forecast: f64, realized: f64) -> bool {
        if forecast > 0.0 {
            (realized - forecast).abs() / forecast > self.threshold
        } else {
            realized > 0.0
        }
    }

    /// slots whose realized demand deviates from the forecast. unobserved slots never do.
    pub fn deviations(&self, forecast: &[f64], realized: &[Option<f64>]) -> Vec<SlotDeviation> {
        forecast
            .iter()
            .zip(realized.iter())
            .enumerate()
            .filter_map(|(slot, (f, r))| {
                let r = (*r)?;
                if !self.deviates(*f, r) {
                    return None;
                }
                let relative_error = if *f > 0.0 {
                    Some((r - f).abs() / f)
                } else {
                    None
                };
                Some(SlotDeviation {
                    slot,
                    forecast: *f,
                    realized: r,
                    relative_error,
                })
            })
            .collect_vec()
    }
}

/// compares realized demand with the forecast of an allocated plan and, if the trigger
/// fires, re-solves the horizon from the first deviating slot with realized values
/// substituted for observed slots. allocations before that slot are kept.
pub fn replan(
    solver: &dyn AllocationSolver,
    request: &AllocationRequest,
    plan: &AllocationPlan,
    realized: &[Option<f64>],
    trigger: &ReoptimizationTrigger,
) -> Result<FeedbackReport, OptimizerError> {
    let deviations = trigger.deviations(&request.forecast, realized);
    let first = deviations.first().map(|d| d.slot);
    let start = match first {
        Some(start) if plan.is_feasible() => start,
        _ => {
            if first.is_some() {
                log::warn!("forecast deviation detected but the original plan is infeasible, not re-planning");
            }
            return Ok(FeedbackReport {
                threshold: trigger.threshold,
                triggered: false,
                first_deviation_slot: first,
                deviations,
                revised_forecast: request.forecast.clone(),
                revised_plan: None,
            });
        }
    };
    log::info!(
        "{} slots deviate from the forecast by more than {:.1}%, re-planning from slot {start}",
        deviations.len(),
        trigger.threshold * 100.0
    );

    let revised_forecast = request
        .forecast
        .iter()
        .zip(realized.iter().map(Some).chain(std::iter::repeat(None)))
        .enumerate()
        .map(|(slot, (f, r))| match r {
            Some(Some(observed)) if slot >= start => *observed,
            _ => *f,
        })
        .collect_vec();
    let remainder = AllocationRequest {
        forecast: revised_forecast[start..].to_vec(),
        fleet_size: request.fleet_size,
        slot_capacity: request.slot_capacity,
        constraints: shift_constraints(&request.constraints, start),
    };
    let remainder_plan = solver.allocate(&remainder)?;
    let revised_request = AllocationRequest {
        forecast: revised_forecast.clone(),
        ..request.clone()
    };
    let revised_plan = match remainder_plan.status {
        PlanStatus::Infeasible(reason) => {
            log::warn!("re-planning from slot {start} is infeasible: {reason:?}");
            AllocationPlan::infeasible(reason, &revised_request)
        }
        remainder_status => {
            let allocations = plan.allocations[..start]
                .iter()
                .chain(remainder_plan.allocations.iter())
                .copied()
                .collect_vec();
            let status = match (plan.status, remainder_status) {
                (PlanStatus::Optimal, PlanStatus::Optimal) => PlanStatus::Optimal,
                _ => PlanStatus::Feasible,
            };
            AllocationPlan::solved(allocations, status, &revised_request)
        }
    };
    Ok(FeedbackReport {
        threshold: trigger.threshold,
        triggered: true,
        first_deviation_slot: Some(start),
        deviations,
        revised_forecast,
        revised_plan: Some(revised_plan),
    })
}

/// operator constraints for the horizon suffix starting at `start`.
fn shift_constraints(constraints: &AllocationConstraints, start: usize) -> AllocationConstraints {
    AllocationConstraints {
        min_trains_per_slot: constraints.min_trains_per_slot,
        max_trains_per_slot: constraints.max_trains_per_slot,
        slot_overrides: constraints
            .slot_overrides
            .iter()
            .filter(|o| o.slot >= start)
            .map(|o| SlotOverride {
                slot: o.slot - start,
                ..o.clone()
            })
            .collect_vec(),
    }
}
