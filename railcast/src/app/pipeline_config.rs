use std::path::Path;

use config::{Config, Environment, File};
use railcast_core::{
    feature::FeatureConfig,
    model::TimeBucket,
    optimize::{OptimizerConfig, OptimizerType},
};
use serde::{Deserialize, Serialize};

use crate::RailcastError;

/// pipeline settings read from an optional TOML file and `RAILCAST_*` environment
/// variables. every key has a default, so an empty file is a valid configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    #[serde(default)]
    pub time_bucket: TimeBucket,
    /// number of slots planned in one allocation
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    #[serde(default = "default_occupancy_target")]
    pub occupancy_target: f64,
    /// trains available per slot. defaults to the number of available trains in the roster
    #[serde(default)]
    pub fleet_size: Option<u32>,
    #[serde(default = "default_event_window_pre_hours")]
    pub event_window_pre_hours: u32,
    #[serde(default = "default_event_window_post_hours")]
    pub event_window_post_hours: u32,
    /// relative forecast error above which the remaining horizon is re-planned
    #[serde(default = "default_reopt_threshold")]
    pub reopt_threshold: f64,
    #[serde(default)]
    pub optimizer: OptimizerType,
    /// trailing days of data held out for evaluation
    #[serde(default = "default_test_days")]
    pub test_days: u32,
    #[serde(default = "default_ridge")]
    pub ridge: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// wall clock budget of the integer program as a humantime duration
    #[serde(default = "default_time_limit")]
    pub time_limit: Option<String>,
    /// node budget of the integer program
    #[serde(default)]
    pub node_limit: Option<u64>,
}

fn default_horizon() -> usize {
    24
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

fn default_reopt_threshold() -> f64 {
    0.1
}

fn default_test_days() -> u32 {
    7
}

fn default_ridge() -> f64 {
    1.0
}

fn default_seed() -> u64 {
    42
}

fn default_time_limit() -> Option<String> {
    Some(String::from("10s"))
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            time_bucket: TimeBucket::default(),
            horizon: default_horizon(),
            occupancy_target: default_occupancy_target(),
            fleet_size: None,
            event_window_pre_hours: default_event_window_pre_hours(),
            event_window_post_hours: default_event_window_post_hours(),
            reopt_threshold: default_reopt_threshold(),
            optimizer: OptimizerType::default(),
            test_days: default_test_days(),
            ridge: default_ridge(),
            seed: default_seed(),
            time_limit: default_time_limit(),
            node_limit: None,
        }
    }
}

impl PipelineConfig {
    /// loads the configuration file (if any) layered under `RAILCAST_*` environment
    /// variables, then validates it.
    pub fn load(config_file: Option<&str>) -> Result<PipelineConfig, RailcastError> {
        let mut builder = Config::builder();
        if let Some(config_file) = config_file {
            builder = builder.add_source(File::from(Path::new(config_file)));
        }
        let config = builder
            .add_source(Environment::with_prefix("RAILCAST"))
            .build()
            .map_err(|e| {
                let source = config_file.unwrap_or("environment");
                RailcastError::ConfigError(format!("'{source}' produced error: {e}"))
            })?
            .try_deserialize::<PipelineConfig>()
            .map_err(|e| RailcastError::ConfigError(format!("error reading pipeline keys: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RailcastError> {
        if self.horizon == 0 {
            return Err(RailcastError::ConfigError(String::from(
                "horizon must be at least one slot",
            )));
        }
        if !self.reopt_threshold.is_finite() || self.reopt_threshold < 0.0 {
            return Err(RailcastError::ConfigError(format!(
                "reopt_threshold must be non-negative, found {}",
                self.reopt_threshold
            )));
        }
        if self.fleet_size == Some(0) {
            return Err(RailcastError::ConfigError(String::from(
                "fleet_size override must be positive",
            )));
        }
        self.feature_config().validate()?;
        Ok(())
    }

    pub fn feature_config(&self) -> FeatureConfig {
        FeatureConfig {
            time_bucket: self.time_bucket,
            occupancy_target: self.occupancy_target,
            event_window_pre_hours: self.event_window_pre_hours,
            event_window_post_hours: self.event_window_post_hours,
            ..Default::default()
        }
    }

    /// this configuration with the feature options a model was trained with, so planning
    /// sizes slots at the same occupancy and bucket width the model learned from.
    pub fn with_feature_config(&self, features: &FeatureConfig) -> PipelineConfig {
        PipelineConfig {
            time_bucket: features.time_bucket,
            occupancy_target: features.occupancy_target,
            event_window_pre_hours: features.event_window_pre_hours,
            event_window_post_hours: features.event_window_post_hours,
            ..self.clone()
        }
    }

    pub fn optimizer_config(&self) -> OptimizerConfig {
        OptimizerConfig::new(
            &self.optimizer,
            self.node_limit,
            self.time_limit.as_ref(),
            self.seed,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let conf = PipelineConfig::default();
        assert_eq!(conf.horizon, 24);
        assert_eq!(conf.test_days, 7);
        assert_eq!(conf.optimizer, OptimizerType::IntegerProgram);
        assert_eq!(conf.feature_config(), FeatureConfig::default());
    }

    #[test]
    fn test_load_toml() {
        let dir = std::env::temp_dir().join("railcast-config-test");
        crate::io::fs::create_dirs(&dir).expect("test invariant failed: directory should be created");
        let path = dir.join("railcast.toml");
        std::fs::write(
            &path,
            "horizon = 12\noccupancy_target = 0.75\noptimizer = \"heuristic_search\"\ntime_bucket = \"30m\"\nfleet_size = 4\n",
        )
        .expect("test invariant failed: fixture should be written");
        let conf = PipelineConfig::load(path.to_str())
            .expect("test invariant failed: config should load");
        assert_eq!(conf.horizon, 12);
        assert_eq!(conf.occupancy_target, 0.75);
        assert_eq!(conf.optimizer, OptimizerType::HeuristicSearch);
        assert_eq!(conf.time_bucket.seconds(), 1800);
        assert_eq!(conf.fleet_size, Some(4));
        assert_eq!(conf.ridge, 1.0);
        assert_eq!(conf.time_limit, Some(String::from("10s")));
    }

    #[test]
    fn test_rejects_bad_values() {
        let conf = PipelineConfig {
            occupancy_target: 1.5,
            ..Default::default()
        };
        assert!(conf.validate().is_err());
        let conf = PipelineConfig {
            horizon: 0,
            ..Default::default()
        };
        assert!(conf.validate().is_err());
    }
}
