use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use railcast_core::optimize::{AllocationConstraints, OptimizerType};
use serde::{Deserialize, Serialize};

use super::PipelineConfig;
use crate::{
    io::{csv_ops, fs, model_store},
    pipeline::{self, PipelineInputs, ScheduleReport},
    synthetic::{self, SyntheticConfig},
    RailcastError,
};

/// Command line tool for rail demand forecasting and train allocation planning
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct RailcastApp {
    #[command(subcommand)]
    pub op: RailcastOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum RailcastOperation {
    /// write seeded synthetic demand, event and fleet files
    Generate {
        /// location on disk to write demand.csv, events.csv and fleet.csv
        #[arg(short, long)]
        output_directory: String,
        /// random seed, overrides the configured seed
        #[arg(long)]
        seed: Option<u64>,
        /// number of days of hourly demand to generate
        #[arg(long, default_value_t = 30)]
        days: u32,
        /// number of trains in the generated roster
        #[arg(long, default_value_t = 6)]
        num_trains: usize,
        #[arg(long)]
        config_file: Option<String>,
    },
    /// derive the feature table from demand observations
    Features {
        #[arg(long)]
        data_path: String,
        #[arg(long)]
        fleet_path: String,
        #[arg(long)]
        events_path: Option<String>,
        /// location on disk to write features.csv
        #[arg(short, long)]
        output_directory: String,
        #[arg(long)]
        config_file: Option<String>,
    },
    /// fit and evaluate the demand forecaster
    Train {
        #[arg(long)]
        data_path: String,
        #[arg(long)]
        fleet_path: String,
        #[arg(long)]
        events_path: Option<String>,
        /// directory receiving model.json and metrics.json
        #[arg(long)]
        models_dir: String,
        #[arg(long)]
        config_file: Option<String>,
    },
    /// forecast a route's horizon with a trained model and plan train allocations
    Run {
        #[arg(long)]
        data_path: String,
        #[arg(long)]
        fleet_path: String,
        /// directory holding model.json from a previous train operation
        #[arg(long)]
        models_dir: String,
        /// directory receiving schedule.json (and feedback.json)
        #[arg(long)]
        output_dir: String,
        /// allocation solver, overrides the configured optimizer
        #[arg(long, value_enum)]
        optimizer: Option<OptimizerType>,
        #[arg(long)]
        events_path: Option<String>,
        /// JSON file of operator allocation constraints
        #[arg(long)]
        constraints: Option<String>,
        /// compare realized demand with the forecast and re-plan when it deviates
        #[arg(long)]
        feedback: bool,
        /// relative deviation that triggers re-planning, overrides the configured threshold
        #[arg(long)]
        reopt_threshold: Option<f64>,
        #[arg(long)]
        config_file: Option<String>,
        /// route to plan, defaults to the first route by name
        #[arg(long)]
        route: Option<String>,
    },
    /// plan train allocations for a forecast file with columns slot,forecast
    Allocate {
        #[arg(long)]
        forecast_path: String,
        #[arg(long)]
        fleet_path: String,
        #[arg(long)]
        output_dir: String,
        #[arg(long, value_enum)]
        optimizer: Option<OptimizerType>,
        #[arg(long)]
        constraints: Option<String>,
        #[arg(long)]
        config_file: Option<String>,
    },
}

impl RailcastOperation {
    pub fn run(&self) -> Result<(), RailcastError> {
        match self {
            RailcastOperation::Generate {
                output_directory,
                seed,
                days,
                num_trains,
                config_file,
            } => {
                let config = PipelineConfig::load(config_file.as_deref())?;
                let synthetic_config = SyntheticConfig {
                    seed: seed.unwrap_or(config.seed),
                    days: *days,
                    num_trains: *num_trains,
                    ..Default::default()
                };
                let outdir = Path::new(output_directory);
                fs::create_dirs(outdir)?;
                let data = synthetic::generate(&synthetic_config)?;
                csv_ops::write_csv(&data.demand, &outdir.join("demand.csv"), "write demand")?;
                csv_ops::write_csv(&data.events, &outdir.join("events.csv"), "write events")?;
                csv_ops::write_csv(&data.trains, &outdir.join("fleet.csv"), "write fleet")?;
                Ok(())
            }
            RailcastOperation::Features {
                data_path,
                fleet_path,
                events_path,
                output_directory,
                config_file,
            } => {
                let config = PipelineConfig::load(config_file.as_deref())?;
                let inputs = pipeline_inputs(data_path, fleet_path, events_path.as_ref());
                let (demand, events, fleet) = inputs.load()?;
                let rows = pipeline::derive_features(
                    &demand,
                    events.as_deref(),
                    &fleet,
                    &config.feature_config(),
                )?;
                let outdir = Path::new(output_directory);
                fs::create_dirs(outdir)?;
                csv_ops::write_csv(&rows, &outdir.join("features.csv"), "write features")
            }
            RailcastOperation::Train {
                data_path,
                fleet_path,
                events_path,
                models_dir,
                config_file,
            } => {
                let config = PipelineConfig::load(config_file.as_deref())?;
                let inputs = pipeline_inputs(data_path, fleet_path, events_path.as_ref());
                let (demand, events, fleet) = inputs.load()?;
                let rows = pipeline::derive_features(
                    &demand,
                    events.as_deref(),
                    &fleet,
                    &config.feature_config(),
                )?;
                let (artifact, report) = pipeline::train_model(rows, &config)?;
                let models_dir = Path::new(models_dir);
                model_store::save_model(&artifact, models_dir)?;
                fs::write_json(&report, &models_dir.join("metrics.json"))
            }
            RailcastOperation::Run {
                data_path,
                fleet_path,
                models_dir,
                output_dir,
                optimizer,
                events_path,
                constraints,
                feedback,
                reopt_threshold,
                config_file,
                route,
            } => {
                let mut config = PipelineConfig::load(config_file.as_deref())?;
                if let Some(optimizer) = optimizer {
                    config.optimizer = *optimizer;
                }
                if let Some(threshold) = reopt_threshold {
                    config.reopt_threshold = *threshold;
                }
                config.validate()?;
                let artifact = model_store::load_model(Path::new(models_dir))?;
                if artifact.feature_config != config.feature_config() {
                    log::warn!("feature options differ from those the model was trained with, using the model's options");
                }
                let constraints = load_constraints(constraints.as_deref())?;
                let solver = config.optimizer_config().build()?;

                let inputs = pipeline_inputs(data_path, fleet_path, events_path.as_ref());
                let (demand, events, fleet) = inputs.load()?;
                let rows = pipeline::derive_features(
                    &demand,
                    events.as_deref(),
                    &fleet,
                    &artifact.feature_config,
                )?;
                let (schedule, feedback_report) = pipeline::plan_route(
                    &rows,
                    &artifact,
                    &fleet,
                    &config,
                    route.as_deref(),
                    constraints,
                    solver.as_ref(),
                    *feedback,
                )?;
                let outdir = Path::new(output_dir);
                fs::create_dirs(outdir)?;
                fs::write_json(&schedule, &outdir.join("schedule.json"))?;
                if let Some(report) = feedback_report {
                    fs::write_json(&report, &outdir.join("feedback.json"))?;
                }
                Ok(())
            }
            RailcastOperation::Allocate {
                forecast_path,
                fleet_path,
                output_dir,
                optimizer,
                constraints,
                config_file,
            } => {
                let mut config = PipelineConfig::load(config_file.as_deref())?;
                if let Some(optimizer) = optimizer {
                    config.optimizer = *optimizer;
                }
                let constraints = load_constraints(constraints.as_deref())?;
                let solver = config.optimizer_config().build()?;
                let forecast = csv_ops::read_forecast(Path::new(forecast_path))?;
                let fleet = csv_ops::read_fleet(Path::new(fleet_path))?;
                let (request, plan) = pipeline::allocate_forecast(
                    forecast,
                    &fleet,
                    &config,
                    constraints,
                    solver.as_ref(),
                )?;
                let schedule = ScheduleReport {
                    route: None,
                    optimizer: solver.name(),
                    fleet_size: request.fleet_size,
                    slot_capacity: request.slot_capacity,
                    slot_starts: vec![],
                    forecast: request.forecast,
                    plan,
                };
                let outdir = Path::new(output_dir);
                fs::create_dirs(outdir)?;
                fs::write_json(&schedule, &outdir.join("schedule.json"))
            }
        }
    }
}

fn pipeline_inputs(data_path: &str, fleet_path: &str, events_path: Option<&String>) -> PipelineInputs {
    PipelineInputs {
        data_path: PathBuf::from(data_path),
        fleet_path: PathBuf::from(fleet_path),
        events_path: events_path.map(PathBuf::from),
    }
}

/// reads operator constraints, or none at all if no file is given.
fn load_constraints(path: Option<&str>) -> Result<AllocationConstraints, RailcastError> {
    match path {
        Some(path) => fs::read_json(Path::new(path)),
        None => Ok(AllocationConstraints::default()),
    }
}
