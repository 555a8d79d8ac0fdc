use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// a special event (concert, match, festival) expected to raise demand on a route.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EventObservation {
    #[serde(with = "crate::model::datetime_codec")]
    pub timestamp: NaiveDateTime,
    pub route: String,
    /// expected attendance, strictly positive
    pub event_size: u32,
}

impl EventObservation {
    pub fn new(timestamp: NaiveDateTime, route: &str, event_size: u32) -> Self {
        Self {
            timestamp,
            route: route.to_string(),
            event_size,
        }
    }
}
