use std::collections::HashSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::capacity::CapacityError;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrainStatus {
    #[default]
    Available,
    Maintenance,
    Retired,
}

/// one row of the fleet roster file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TrainRecord {
    pub train_id: String,
    /// passenger capacity of the consist
    pub capacity: u32,
    #[serde(default)]
    pub status: TrainStatus,
}

impl TrainRecord {
    pub fn new(train_id: &str, capacity: u32, status: TrainStatus) -> Self {
        Self {
            train_id: train_id.to_string(),
            capacity,
            status,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == TrainStatus::Available
    }
}

/// validated, ordered collection of trains. only trains with [`TrainStatus::Available`]
/// contribute to fleet size and capacity statistics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FleetRoster {
    trains: Vec<TrainRecord>,
}

impl FleetRoster {
    /// builds a roster, rejecting zero capacities and repeated train ids.
    pub fn new(trains: Vec<TrainRecord>) -> Result<FleetRoster, CapacityError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for train in trains.iter() {
            if train.capacity == 0 {
                return Err(CapacityError::InvalidCapacity {
                    train_id: train.train_id.clone(),
                    capacity: train.capacity,
                });
            }
            if !seen.insert(train.train_id.as_str()) {
                return Err(CapacityError::DuplicateTrain(train.train_id.clone()));
            }
        }
        Ok(FleetRoster { trains })
    }

    pub fn trains(&self) -> &[TrainRecord] {
        &self.trains
    }

    pub fn available(&self) -> impl Iterator<Item = &TrainRecord> {
        self.trains.iter().filter(|t| t.is_available())
    }

    /// number of trains that can be scheduled.
    pub fn fleet_size(&self) -> u32 {
        self.available().count() as u32
    }

    /// mean capacity across available trains, None if no train is available.
    pub fn mean_capacity(&self) -> Option<f64> {
        let n = self.fleet_size();
        if n == 0 {
            return None;
        }
        let sum: f64 = self.available().map(|t| t.capacity as f64).sum();
        Some(sum / n as f64)
    }

    /// capacities of the available trains, largest first. equal capacities are ordered
    /// by train id so the result depends only on roster contents.
    pub fn capacities_descending(&self) -> Vec<u32> {
        self.available()
            .sorted_by(|a, b| {
                b.capacity
                    .cmp(&a.capacity)
                    .then_with(|| a.train_id.cmp(&b.train_id))
            })
            .map(|t| t.capacity)
            .collect_vec()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn roster() -> FleetRoster {
        FleetRoster::new(vec![
            TrainRecord::new("T1", 180, TrainStatus::Available),
            TrainRecord::new("T2", 350, TrainStatus::Available),
            TrainRecord::new("T3", 400, TrainStatus::Maintenance),
            TrainRecord::new("T4", 220, TrainStatus::Available),
        ])
        .expect("test invariant failed: roster should be valid")
    }

    #[test]
    fn test_only_available_trains_count() {
        let fleet = roster();
        assert_eq!(fleet.fleet_size(), 3);
        assert_eq!(fleet.capacities_descending(), vec![350, 220, 180]);
        let mean = fleet.mean_capacity().unwrap();
        assert!((mean - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let result = FleetRoster::new(vec![TrainRecord::new("T1", 0, TrainStatus::Available)]);
        assert!(matches!(result, Err(CapacityError::InvalidCapacity { .. })));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = FleetRoster::new(vec![
            TrainRecord::new("T1", 100, TrainStatus::Available),
            TrainRecord::new("T1", 200, TrainStatus::Retired),
        ]);
        assert_eq!(result, Err(CapacityError::DuplicateTrain(String::from("T1"))));
    }

    #[test]
    fn test_empty_roster_has_no_mean() {
        let fleet = FleetRoster::new(vec![]).unwrap();
        assert_eq!(fleet.fleet_size(), 0);
        assert_eq!(fleet.mean_capacity(), None);
    }
}
