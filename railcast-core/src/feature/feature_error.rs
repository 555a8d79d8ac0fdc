use itertools::Itertools;

use crate::capacity::CapacityError;

#[derive(thiserror::Error, Debug)]
pub enum FeatureError {
    #[error("route '{route}' has no valid demand observations, cannot compute a median to fill missing demand")]
    NoDemandHistory { route: String },
    #[error("more than one observation for route '{route}' at {timestamp}")]
    DuplicateObservation { route: String, timestamp: String },
    #[error("route '{route}' at {timestamp} has demand {value}, demand must be finite and non-negative")]
    InvalidDemand {
        route: String,
        timestamp: String,
        value: f64,
    },
    #[error("route '{route}' at {timestamp} has an event with size 0, event size must be positive")]
    InvalidEvent { route: String, timestamp: String },
    #[error("timestamp {timestamp} on route '{route}' is not aligned to the '{bucket}' time bucket")]
    MisalignedTimestamp {
        route: String,
        timestamp: String,
        bucket: String,
    },
    #[error("invalid feature configuration: {0}")]
    InvalidConfig(String),
    #[error("route '{0}' is not known to the route encoder")]
    UnknownRoute(String),
    #[error("failure computing capacity baseline: {0}")]
    Capacity(#[from] CapacityError),
    #[error("errors encountered while deriving features for multiple routes: {0}")]
    BatchProcessing(String),
}

/// collapses the errors from a batch of routes into a single error. a batch with one
/// failure reports that failure unchanged.
pub fn batch_processing_error(mut errors: Vec<FeatureError>) -> FeatureError {
    if errors.len() == 1 {
        if let Some(error) = errors.pop() {
            return error;
        }
    }
    let concatenated = errors.iter().map(|e| e.to_string()).join("\n  ");
    FeatureError::BatchProcessing(format!("[\n  {concatenated}\n]"))
}
