use crate::model::FleetRoster;

use super::CapacityError;

/// derives train-count baselines for a demand value from a fleet roster scaled by
/// a target occupancy fraction.
#[derive(Clone, Debug)]
pub struct CapacityEstimator {
    occupancy_target: f64,
    mean_capacity: f64,
    /// capacity of each available train, largest first
    sorted_capacities: Vec<u32>,
}

impl CapacityEstimator {
    pub fn new(fleet: &FleetRoster, occupancy_target: f64) -> Result<CapacityEstimator, CapacityError> {
        if !occupancy_target.is_finite() || occupancy_target <= 0.0 || occupancy_target > 1.0 {
            return Err(CapacityError::InvalidOccupancyTarget(occupancy_target));
        }
        let mean_capacity = fleet.mean_capacity().ok_or(CapacityError::EmptyFleet)?;
        Ok(CapacityEstimator {
            occupancy_target,
            mean_capacity,
            sorted_capacities: fleet.capacities_descending(),
        })
    }

    pub fn occupancy_target(&self) -> f64 {
        self.occupancy_target
    }

    pub fn fleet_size(&self) -> u32 {
        self.sorted_capacities.len() as u32
    }

    /// mean train capacity at the target occupancy.
    pub fn effective_capacity(&self) -> f64 {
        self.mean_capacity * self.occupancy_target
    }

    /// passengers the whole available fleet carries at the target occupancy.
    pub fn total_effective_capacity(&self) -> f64 {
        self.sorted_capacities
            .iter()
            .map(|c| *c as f64 * self.occupancy_target)
            .sum()
    }

    /// uniform-capacity approximation: ceil(demand / (mean capacity * occupancy target)).
    pub fn baseline_required_trains(&self, demand: f64) -> Result<u32, CapacityError> {
        validate_demand(demand)?;
        Ok((demand / self.effective_capacity()).ceil() as u32)
    }

    /// bin-packing estimate that adds the largest trains first until their effective
    /// capacity covers demand. the first train is always counted, so any demand needs at
    /// least one train. if the fleet cannot cover demand, the fleet size is returned.
    pub fn greedy_min_trains(&self, demand: f64) -> Result<u32, CapacityError> {
        validate_demand(demand)?;
        let mut covered = 0.0;
        for (idx, capacity) in self.sorted_capacities.iter().enumerate() {
            covered += *capacity as f64 * self.occupancy_target;
            if covered >= demand {
                return Ok(idx as u32 + 1);
            }
        }
        Ok(self.fleet_size())
    }
}

fn validate_demand(demand: f64) -> Result<(), CapacityError> {
    if !demand.is_finite() || demand < 0.0 {
        Err(CapacityError::InvalidDemand(demand))
    } else {
        Ok(())
    }
}
