use crate::feature::FeatureError;

#[derive(thiserror::Error, Debug)]
pub enum ForecastError {
    #[error("no trained forecast model is available: {0}")]
    ModelUnavailable(String),
    #[error("feature matrix does not match the model columns: {0}")]
    ColumnMismatch(String),
    #[error("failure fitting forecast model: {0}")]
    FitFailure(String),
    #[error("invalid forecast input: {0}")]
    InvalidInput(String),
    #[error("failure building feature matrix: {0}")]
    Feature(#[from] FeatureError),
}
