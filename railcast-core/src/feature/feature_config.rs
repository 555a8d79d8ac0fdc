use serde::{Deserialize, Serialize};

use crate::model::TimeBucket;

use super::FeatureError;

/// options for [`super::derive`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FeatureConfig {
    /// width of one observation bucket. every timestamp must sit on a bucket boundary.
    #[serde(default)]
    pub time_bucket: TimeBucket,
    /// fraction of train capacity we plan to fill, in (0, 1]
    #[serde(default = "default_occupancy_target")]
    pub occupancy_target: f64,
    /// hours before an event during which a row is flagged as inside the event window
    #[serde(default = "default_event_window_pre_hours")]
    pub event_window_pre_hours: u32,
    /// hours after an event during which a row is flagged as inside the event window
    #[serde(default = "default_event_window_post_hours")]
    pub event_window_post_hours: u32,
    /// quantile of cleaned demand (across all routes) used as the outlier reference
    #[serde(default = "default_outlier_quantile")]
    pub outlier_quantile: f64,
    /// demand is clipped to this multiple of the outlier reference
    #[serde(default = "default_outlier_multiplier")]
    pub outlier_multiplier: f64,
}

fn default_occupancy_target() -> f64 {
    0.8
}

fn default_event_window_pre_hours() -> u32 {
    2
}

fn default_event_window_post_hours() -> u32 {
    3
}

fn default_outlier_quantile() -> f64 {
    0.999
}

fn default_outlier_multiplier() -> f64 {
    1.2
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            time_bucket: TimeBucket::default(),
            occupancy_target: default_occupancy_target(),
            event_window_pre_hours: default_event_window_pre_hours(),
            event_window_post_hours: default_event_window_post_hours(),
            outlier_quantile: default_outlier_quantile(),
            outlier_multiplier: default_outlier_multiplier(),
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<(), FeatureError> {
        let occ = self.occupancy_target;
        if !occ.is_finite() || occ <= 0.0 || occ > 1.0 {
            return Err(FeatureError::InvalidConfig(format!(
                "occupancy_target must be in (0, 1], found {occ}"
            )));
        }
        let q = self.outlier_quantile;
        if !q.is_finite() || q <= 0.0 || q > 1.0 {
            return Err(FeatureError::InvalidConfig(format!(
                "outlier_quantile must be in (0, 1], found {q}"
            )));
        }
        let m = self.outlier_multiplier;
        if !m.is_finite() || m < 1.0 {
            return Err(FeatureError::InvalidConfig(format!(
                "outlier_multiplier must be at least 1.0, found {m}"
            )));
        }
        Ok(())
    }
}
