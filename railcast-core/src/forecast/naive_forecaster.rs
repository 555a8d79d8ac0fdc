use itertools::Itertools;

use super::{FeatureMatrix, ForecastError, Forecaster};

/// persistence baseline: the next bucket's demand equals the current bucket's cleaned demand.
#[derive(Clone, Debug, Default)]
pub struct NaiveForecaster;

const DEMAND_COLUMN: &str = "passenger_demand";

impl Forecaster for NaiveForecaster {
    fn name(&self) -> String {
        String::from("naive_persistence")
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ForecastError> {
        let idx = features.column_index(DEMAND_COLUMN).ok_or_else(|| {
            ForecastError::ColumnMismatch(format!("missing column '{DEMAND_COLUMN}'"))
        })?;
        Ok(features.rows().iter().map(|r| r[idx].max(0.0)).collect_vec())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_persistence() {
        let m = FeatureMatrix::new(
            vec!["hour".to_string(), "passenger_demand".to_string()],
            vec![vec![1.0, 120.0], vec![2.0, 95.5]],
        )
        .unwrap();
        assert_eq!(NaiveForecaster.predict(&m).unwrap(), vec![120.0, 95.5]);
    }

    #[test]
    fn test_missing_column() {
        let m = FeatureMatrix::new(vec!["hour".to_string()], vec![vec![1.0]]).unwrap();
        assert!(NaiveForecaster.predict(&m).is_err());
    }
}
