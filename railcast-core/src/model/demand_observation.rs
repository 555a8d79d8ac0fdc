use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// a single (timestamp, route) passenger demand reading. demand may be
/// absent when the source failed to report a value for that bucket.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DemandObservation {
    /// start of the time bucket this observation covers
    #[serde(with = "crate::model::datetime_codec")]
    pub timestamp: NaiveDateTime,
    /// route identifier
    pub route: String,
    /// passenger count observed in the bucket, None if unknown
    pub passenger_demand: Option<f64>,
}

impl DemandObservation {
    pub fn new(timestamp: NaiveDateTime, route: &str, passenger_demand: Option<f64>) -> Self {
        Self {
            timestamp,
            route: route.to_string(),
            passenger_demand,
        }
    }
}
