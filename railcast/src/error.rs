use std::path::PathBuf;

use railcast_core::{
    capacity::CapacityError, feature::FeatureError, forecast::ForecastError,
    optimize::OptimizerError,
};

#[derive(thiserror::Error, Debug)]
pub enum RailcastError {
    #[error("Invalid input: {0}")]
    InvalidUserInput(String),
    #[error("Error reading from '{path}': {message}")]
    ReadError { path: PathBuf, message: String },
    #[error("Error writing to '{path}': {message}")]
    WriteError { path: PathBuf, message: String },
    #[error("invalid pipeline configuration: {0}")]
    ConfigError(String),
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
    #[error(transparent)]
    Optimizer(#[from] OptimizerError),
    #[error("{0}")]
    InternalError(String),
}
