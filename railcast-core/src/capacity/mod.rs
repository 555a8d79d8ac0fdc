mod capacity_error;
mod capacity_estimator;

pub use capacity_error::CapacityError;
pub use capacity_estimator::CapacityEstimator;
