use railcast_core::optimize::AllocationPlan;
use serde::{Deserialize, Serialize};

/// one slot of a forecast file consumed by the allocate operation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ForecastRecord {
    pub slot: usize,
    pub forecast: f64,
}

/// contents of schedule.json: the forecast that was planned against and the resulting plan.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScheduleReport {
    pub route: Option<String>,
    pub optimizer: String,
    pub fleet_size: u32,
    /// passengers one train carries at the target occupancy
    pub slot_capacity: f64,
    /// start of each planned slot, empty when the forecast was not tied to timestamps
    pub slot_starts: Vec<String>,
    pub forecast: Vec<f64>,
    pub plan: AllocationPlan,
}
