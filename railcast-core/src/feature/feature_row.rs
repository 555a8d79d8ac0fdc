use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 15;

/// names of the numeric model inputs of a [`FeatureRow`], in the order produced by
/// [`FeatureRow::feature_values`]. route indicator columns are appended separately
/// by the [`super::RouteEncoder`].
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "hour",
    "day_of_week",
    "is_weekend",
    "is_night",
    "month",
    "event_size",
    "is_event_window",
    "passenger_demand",
    "lag_1",
    "lag_24",
    "rolling_3",
    "rolling_6",
    "rolling_24",
    "baseline_required_trains",
    "greedy_min_trains",
];

/// one derived row per (timestamp, route). rows are produced sorted by route and
/// then time, and are not modified afterward.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FeatureRow {
    #[serde(with = "crate::model::datetime_codec")]
    pub timestamp: NaiveDateTime,
    pub route: String,
    pub hour: u32,
    /// Monday = 0 through Sunday = 6
    pub day_of_week: u32,
    pub is_weekend: bool,
    pub is_night: bool,
    pub month: u32,
    pub event_size: u32,
    pub is_event_window: u8,
    /// cleaned (gap-filled, outlier-clipped) demand
    pub passenger_demand: f64,
    pub lag_1: f64,
    pub lag_24: f64,
    pub rolling_3: f64,
    pub rolling_6: f64,
    pub rolling_24: f64,
    pub baseline_required_trains: u32,
    pub greedy_min_trains: u32,
    /// cleaned demand of the next row of the same route. None on the last row of a route.
    pub target_next_hour: Option<f64>,
}

impl FeatureRow {
    /// true if this row carries a label and can be used for training or evaluation.
    pub fn is_labelled(&self) -> bool {
        self.target_next_hour.is_some()
    }

    /// numeric model inputs, ordered as [`FEATURE_COLUMNS`]. the label is never included.
    pub fn feature_values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.hour as f64,
            self.day_of_week as f64,
            bool_value(self.is_weekend),
            bool_value(self.is_night),
            self.month as f64,
            self.event_size as f64,
            self.is_event_window as f64,
            self.passenger_demand,
            self.lag_1,
            self.lag_24,
            self.rolling_3,
            self.rolling_6,
            self.rolling_24,
            self.baseline_required_trains as f64,
            self.greedy_min_trains as f64,
        ]
    }
}

fn bool_value(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
