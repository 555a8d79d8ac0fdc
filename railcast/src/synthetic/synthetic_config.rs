use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::RailcastError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SyntheticConfig {
    /// seed for every random draw made by the generator
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    #[serde(default = "default_routes")]
    pub routes: Vec<String>,
    /// number of trains in the roster, taken from the largest down
    #[serde(default = "default_num_trains")]
    pub num_trains: usize,
    /// fraction of demand observations blanked out to exercise gap filling
    #[serde(default = "default_missing_fraction")]
    pub missing_fraction: f64,
}

/// train capacities available to the generated roster, largest first.
pub const TRAIN_CAPACITIES: [u32; 6] = [350, 300, 280, 220, 180, 150];

fn default_seed() -> u64 {
    42
}

fn default_days() -> u32 {
    30
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}

fn default_routes() -> Vec<String> {
    vec![
        String::from("Route_A"),
        String::from("Route_B"),
        String::from("Route_C"),
    ]
}

fn default_num_trains() -> usize {
    6
}

fn default_missing_fraction() -> f64 {
    0.02
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            days: default_days(),
            start_date: default_start_date(),
            routes: default_routes(),
            num_trains: default_num_trains(),
            missing_fraction: default_missing_fraction(),
        }
    }
}

impl SyntheticConfig {
    pub fn validate(&self) -> Result<(), RailcastError> {
        if self.days == 0 {
            return Err(RailcastError::InvalidUserInput(String::from(
                "synthetic data needs at least one day",
            )));
        }
        if self.routes.is_empty() {
            return Err(RailcastError::InvalidUserInput(String::from(
                "synthetic data needs at least one route",
            )));
        }
        if self.num_trains == 0 || self.num_trains > TRAIN_CAPACITIES.len() {
            return Err(RailcastError::InvalidUserInput(format!(
                "number of trains must be in [1, {}], found {}",
                TRAIN_CAPACITIES.len(),
                self.num_trains
            )));
        }
        if !(0.0..1.0).contains(&self.missing_fraction) {
            return Err(RailcastError::InvalidUserInput(format!(
                "missing fraction must be in [0, 1), found {}",
                self.missing_fraction
            )));
        }
        Ok(())
    }
}
