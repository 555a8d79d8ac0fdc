use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::OptimizerError;

/// forecasts this close above an integer multiple of slot capacity do not add a train.
const CEILING_TOLERANCE: f64 = 1e-9;

/// operator limits on the number of trains per slot, read from a JSON file.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AllocationConstraints {
    #[serde(default)]
    pub min_trains_per_slot: Option<u32>,
    #[serde(default)]
    pub max_trains_per_slot: Option<u32>,
    #[serde(default)]
    pub slot_overrides: Vec<SlotOverride>,
}

/// bounds for a single slot of the horizon. they apply on top of the per-slot limits.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SlotOverride {
    pub slot: usize,
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub max: Option<u32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AllocationRequest {
    /// predicted passengers per slot
    pub forecast: Vec<f64>,
    /// trains that can run in any one slot
    pub fleet_size: u32,
    /// passengers one train carries at the target occupancy
    pub slot_capacity: f64,
    #[serde(default)]
    pub constraints: AllocationConstraints,
}

impl AllocationRequest {
    pub fn new(forecast: Vec<f64>, fleet_size: u32, slot_capacity: f64) -> AllocationRequest {
        AllocationRequest {
            forecast,
            fleet_size,
            slot_capacity,
            constraints: AllocationConstraints::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: AllocationConstraints) -> AllocationRequest {
        self.constraints = constraints;
        self
    }

    pub fn slots(&self) -> usize {
        self.forecast.len()
    }

    /// checks the request before any solver runs.
    pub fn validate(&self) -> Result<(), OptimizerError> {
        if self.forecast.is_empty() {
            return Err(OptimizerError::InvalidRequest(String::from(
                "forecast horizon is empty",
            )));
        }
        if self.fleet_size == 0 {
            return Err(OptimizerError::InvalidRequest(String::from(
                "fleet size must be positive",
            )));
        }
        if !self.slot_capacity.is_finite() || self.slot_capacity <= 0.0 {
            return Err(OptimizerError::InvalidRequest(format!(
                "slot capacity must be a positive number, found {}",
                self.slot_capacity
            )));
        }
        if let Some((slot, value)) = self
            .forecast
            .iter()
            .find_position(|f| !f.is_finite() || **f < 0.0)
        {
            return Err(OptimizerError::InvalidRequest(format!(
                "forecast for slot {slot} is {value}, forecasts must be finite and non-negative"
            )));
        }
        if let Some(o) = self
            .constraints
            .slot_overrides
            .iter()
            .find(|o| o.slot >= self.slots())
        {
            return Err(OptimizerError::InvalidConstraints(format!(
                "override for slot {} is outside the {}-slot horizon",
                o.slot,
                self.slots()
            )));
        }
        Ok(())
    }

    /// minimum trains per slot needed to carry the forecast.
    pub fn coverage_floors(&self) -> Vec<u32> {
        coverage_floors(&self.forecast, self.slot_capacity)
    }

    /// inclusive (lower, upper) train bounds per slot from the fleet size and operator
    /// constraints. a slot whose lower bound exceeds its upper bound is left that way so the
    /// solver can report the conflict as infeasible.
    pub fn slot_bounds(&self) -> Vec<(u32, u32)> {
        let base_lower = self.constraints.min_trains_per_slot.unwrap_or(0);
        let base_upper = self
            .constraints
            .max_trains_per_slot
            .map(|m| m.min(self.fleet_size))
            .unwrap_or(self.fleet_size);
        let mut bounds = vec![(base_lower, base_upper); self.slots()];
        for o in self.constraints.slot_overrides.iter() {
            if let Some((lower, upper)) = bounds.get_mut(o.slot) {
                if let Some(min) = o.min {
                    *lower = (*lower).max(min);
                }
                if let Some(max) = o.max {
                    *upper = (*upper).min(max);
                }
            }
        }
        bounds
    }
}

/// direct ceiling division of each forecast by the slot capacity.
///
/// the ratio `forecast / slot_capacity` is lowered by an absolute `1e-9` before rounding up,
/// so float noise such as `3.0000000001` trains does not add a train. the tolerance is in
/// trains, not passengers: a forecast at most `1e-9 * slot_capacity` passengers above an
/// exact multiple of the capacity is planned one train short of strict coverage.
pub fn coverage_floors(forecast: &[f64], slot_capacity: f64) -> Vec<u32> {
    forecast
        .iter()
        .map(|f| {
            let ratio = f / slot_capacity - CEILING_TOLERANCE;
            if ratio <= 0.0 {
                0
            } else {
                ratio.ceil() as u32
            }
        })
        .collect_vec()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_coverage_floors() {
        assert_eq!(coverage_floors(&[100.0, 250.0, 80.0], 100.0), vec![1, 3, 1]);
        assert_eq!(coverage_floors(&[0.0, 300.0000000001, 300.1], 100.0), vec![0, 3, 4]);
    }

    #[test]
    fn test_ceiling_tolerance_is_in_trains() {
        let capacity = 1_000_000.0;
        // 5e-4 passengers over three trains is within the tolerance
        assert_eq!(coverage_floors(&[3_000_000.0005], capacity), vec![3]);
        // 5e-3 passengers over is not
        assert_eq!(coverage_floors(&[3_000_000.005], capacity), vec![4]);
    }

    #[test]
    fn test_validate() {
        assert!(AllocationRequest::new(vec![1.0], 3, 10.0).validate().is_ok());
        assert!(AllocationRequest::new(vec![], 3, 10.0).validate().is_err());
        assert!(AllocationRequest::new(vec![1.0], 0, 10.0).validate().is_err());
        assert!(AllocationRequest::new(vec![1.0], 3, 0.0).validate().is_err());
        assert!(AllocationRequest::new(vec![-1.0], 3, 10.0).validate().is_err());
        assert!(AllocationRequest::new(vec![f64::NAN], 3, 10.0).validate().is_err());
        let constraints = AllocationConstraints {
            slot_overrides: vec![SlotOverride {
                slot: 4,
                min: Some(1),
                max: None,
            }],
            ..Default::default()
        };
        let request = AllocationRequest::new(vec![1.0; 2], 3, 10.0).with_constraints(constraints);
        assert!(matches!(
            request.validate(),
            Err(OptimizerError::InvalidConstraints(_))
        ));
    }

    #[test]
    fn test_slot_bounds() {
        let constraints = AllocationConstraints {
            min_trains_per_slot: Some(1),
            max_trains_per_slot: Some(10),
            slot_overrides: vec![SlotOverride {
                slot: 1,
                min: Some(2),
                max: Some(3),
            }],
        };
        let request = AllocationRequest::new(vec![0.0; 3], 4, 10.0).with_constraints(constraints);
        assert_eq!(request.slot_bounds(), vec![(1, 4), (2, 3), (1, 4)]);
    }

    #[test]
    fn test_constraints_from_json() {
        let json = r#"{"max_trains_per_slot": 4, "slot_overrides": [{"slot": 0, "min": 2}]}"#;
        let constraints: AllocationConstraints =
            serde_json::from_str(json).expect("test invariant failed: json should parse");
        assert_eq!(constraints.min_trains_per_slot, None);
        assert_eq!(constraints.max_trains_per_slot, Some(4));
        assert_eq!(constraints.slot_overrides[0].min, Some(2));
        assert_eq!(constraints.slot_overrides[0].max, None);
    }
}
