#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CapacityError {
    #[error("occupancy target must be in (0, 1], found {0}")]
    InvalidOccupancyTarget(f64),
    #[error("train '{train_id}' has capacity {capacity}, capacity must be positive")]
    InvalidCapacity { train_id: String, capacity: u32 },
    #[error("train id '{0}' appears more than once in the fleet roster")]
    DuplicateTrain(String),
    #[error("fleet roster has no available trains")]
    EmptyFleet,
    #[error("demand must be a finite, non-negative number, found {0}")]
    InvalidDemand(f64),
}
