use serde::{Deserialize, Serialize};

use super::ForecastError;

/// accuracy of a forecast against realized values.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ForecastMetrics {
    pub n: usize,
    pub rmse: f64,
    pub mae: f64,
    /// coefficient of determination. 1.0 for a perfect fit of a constant series.
    pub r2: f64,
}

impl ForecastMetrics {
    pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<ForecastMetrics, ForecastError> {
        if actual.len() != predicted.len() {
            return Err(ForecastError::InvalidInput(format!(
                "{} actual values but {} predictions",
                actual.len(),
                predicted.len()
            )));
        }
        if actual.is_empty() {
            return Err(ForecastError::InvalidInput(String::from(
                "cannot evaluate an empty forecast",
            )));
        }
        let n = actual.len();
        let mean = actual.iter().sum::<f64>() / n as f64;
        let (ss_res, abs_sum) = actual
            .iter()
            .zip(predicted.iter())
            .fold((0.0, 0.0), |(ss, abs), (a, p)| (ss + (a - p).powi(2), abs + (a - p).abs()));
        let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };
        Ok(ForecastMetrics {
            n,
            rmse: (ss_res / n as f64).sqrt(),
            mae: abs_sum / n as f64,
            r2,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_perfect_forecast() {
        let m = ForecastMetrics::evaluate(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn test_mean_forecast_has_zero_r2() {
        let m = ForecastMetrics::evaluate(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]).unwrap();
        assert!(m.r2.abs() < 1e-12);
        assert!((m.rmse - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((m.mae - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(ForecastMetrics::evaluate(&[1.0], &[]).is_err());
        assert!(ForecastMetrics::evaluate(&[], &[]).is_err());
    }
}
