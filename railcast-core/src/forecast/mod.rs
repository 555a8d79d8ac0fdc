//! the forecasting boundary. the pipeline only depends on the [`Forecaster`] trait;
//! any deterministic model producing one prediction per feature row can be plugged in.
mod feature_matrix;
mod forecast_error;
mod forecast_metrics;
mod forecaster;
mod linear_forecaster;
mod naive_forecaster;

pub mod linear_algebra;

pub use feature_matrix::{training_set, FeatureMatrix};
pub use forecast_error::ForecastError;
pub use forecast_metrics::ForecastMetrics;
pub use forecaster::Forecaster;
pub use linear_forecaster::LinearForecaster;
pub use naive_forecaster::NaiveForecaster;
