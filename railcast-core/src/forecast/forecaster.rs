use super::{FeatureMatrix, ForecastError};

/// a trained regression model seen from the outside: one demand prediction per feature
/// row, in row order. implementations must be deterministic for a given model and matrix.
pub trait Forecaster: Send + Sync {
    /// short descriptive name used in logs and output files.
    fn name(&self) -> String;

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ForecastError>;
}
