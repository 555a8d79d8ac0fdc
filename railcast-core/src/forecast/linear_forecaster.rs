use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{linear_algebra, FeatureMatrix, ForecastError, Forecaster};

/// columns with a standard deviation below this are treated as constant and get a
/// zero coefficient.
const CONSTANT_COLUMN_TOLERANCE: f64 = 1e-12;

/// ridge regression on standardized features. the fitted model records the column
/// layout it was trained on and aligns incoming matrices to it by column name.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LinearForecaster {
    columns: Vec<String>,
    means: Vec<f64>,
    scales: Vec<f64>,
    coefficients: Vec<f64>,
    intercept: f64,
    ridge: f64,
}

impl LinearForecaster {
    /// fits the model by solving the regularized normal equations
    /// `(ZᵀZ + ridge·I) β = Zᵀ(y - ȳ)` over standardized, non-constant columns.
    pub fn fit(features: &FeatureMatrix, targets: &[f64], ridge: f64) -> Result<LinearForecaster, ForecastError> {
        if !ridge.is_finite() || ridge < 0.0 {
            return Err(ForecastError::FitFailure(format!(
                "ridge penalty must be finite and non-negative, found {ridge}"
            )));
        }
        if features.is_empty() {
            return Err(ForecastError::FitFailure(String::from(
                "cannot fit a model without training rows",
            )));
        }
        if features.n_rows() != targets.len() {
            return Err(ForecastError::FitFailure(format!(
                "{} feature rows but {} targets",
                features.n_rows(),
                targets.len()
            )));
        }
        if let Some(bad) = targets.iter().find(|t| !t.is_finite()) {
            return Err(ForecastError::FitFailure(format!("non-finite target value {bad}")));
        }

        let n = features.n_rows() as f64;
        let p = features.n_columns();
        let rows = features.rows();
        let means = (0..p)
            .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n)
            .collect_vec();
        let stds = (0..p)
            .map(|j| {
                let var = rows.iter().map(|r| (r[j] - means[j]).powi(2)).sum::<f64>() / n;
                var.sqrt()
            })
            .collect_vec();
        let active = (0..p)
            .filter(|j| stds[*j] > CONSTANT_COLUMN_TOLERANCE)
            .collect_vec();
        let scales = stds
            .iter()
            .map(|s| if *s > CONSTANT_COLUMN_TOLERANCE { *s } else { 1.0 })
            .collect_vec();
        let y_mean = targets.iter().sum::<f64>() / n;

        let standardized = rows
            .iter()
            .map(|r| {
                active
                    .iter()
                    .map(|j| (r[*j] - means[*j]) / scales[*j])
                    .collect_vec()
            })
            .collect_vec();
        let k = active.len();
        let mut gram = vec![vec![0.0; k]; k];
        let mut rhs = vec![0.0; k];
        for (z, y) in standardized.iter().zip(targets.iter()) {
            let centered = y - y_mean;
            for a in 0..k {
                rhs[a] += z[a] * centered;
                for b in a..k {
                    gram[a][b] += z[a] * z[b];
                }
            }
        }
        for a in 0..k {
            for b in 0..a {
                gram[a][b] = gram[b][a];
            }
            gram[a][a] += ridge;
        }
        let solution = linear_algebra::solve(gram, rhs).ok_or_else(|| {
            ForecastError::FitFailure(String::from(
                "normal equations are singular, try a positive ridge penalty",
            ))
        })?;

        let mut coefficients = vec![0.0; p];
        for (beta, j) in solution.into_iter().zip(active.iter()) {
            coefficients[*j] = beta;
        }
        log::debug!(
            "fitted linear forecaster on {} rows, {} of {} columns active",
            features.n_rows(),
            k,
            p
        );
        Ok(LinearForecaster {
            columns: features.columns().to_vec(),
            means,
            scales,
            coefficients,
            intercept: y_mean,
            ridge,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn ridge(&self) -> f64 {
        self.ridge
    }
}

impl Forecaster for LinearForecaster {
    fn name(&self) -> String {
        String::from("linear_ridge")
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ForecastError> {
        let aligned = features.aligned_to(&self.columns)?;
        let predictions = aligned
            .rows()
            .iter()
            .map(|row| {
                let linear: f64 = row
                    .iter()
                    .zip(self.means.iter().zip(self.scales.iter()))
                    .zip(self.coefficients.iter())
                    .map(|((x, (mean, scale)), beta)| beta * (x - mean) / scale)
                    .sum();
                (self.intercept + linear).max(0.0)
            })
            .collect_vec();
        Ok(predictions)
    }
}
