use itertools::Itertools;

use crate::feature::{FeatureRow, RouteEncoder, FEATURE_COLUMNS};

use super::ForecastError;

/// label-free numeric view of feature rows with named columns: the fixed
/// [`FEATURE_COLUMNS`] followed by one indicator column per route.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<FeatureMatrix, ForecastError> {
        if let Some((idx, row)) = rows.iter().find_position(|r| r.len() != columns.len()) {
            return Err(ForecastError::InvalidInput(format!(
                "row {idx} has {} values but the matrix has {} columns",
                row.len(),
                columns.len()
            )));
        }
        Ok(FeatureMatrix { columns, rows })
    }

    pub fn from_rows(rows: &[FeatureRow], encoder: &RouteEncoder) -> Result<FeatureMatrix, ForecastError> {
        let columns = FEATURE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(encoder.column_names())
            .collect_vec();
        let values = rows
            .iter()
            .map(|row| {
                let mut values = row.feature_values().to_vec();
                values.extend(encoder.encode(&row.route)?);
                Ok(values)
            })
            .collect::<Result<Vec<_>, ForecastError>>()?;
        FeatureMatrix::new(columns, values)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// re-orders this matrix into the given column layout. every requested column must
    /// exist. columns not requested are dropped only if they are zero in every row, so a
    /// row from a route the layout does not know is rejected instead of silently
    /// losing its route identity.
    pub fn aligned_to(&self, columns: &[String]) -> Result<FeatureMatrix, ForecastError> {
        if self.columns == columns {
            return Ok(self.clone());
        }
        let positions = columns
            .iter()
            .map(|name| {
                self.column_index(name).ok_or_else(|| {
                    ForecastError::ColumnMismatch(format!("missing column '{name}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        for (idx, name) in self.columns.iter().enumerate() {
            if positions.contains(&idx) {
                continue;
            }
            if self.rows.iter().any(|r| r[idx] != 0.0) {
                return Err(ForecastError::ColumnMismatch(format!(
                    "column '{name}' is not known to the model but has non-zero values"
                )));
            }
        }
        let rows = self
            .rows
            .iter()
            .map(|r| positions.iter().map(|p| r[*p]).collect_vec())
            .collect_vec();
        FeatureMatrix::new(columns.to_vec(), rows)
    }
}

/// builds a training (or evaluation) set from the labelled rows only. the final row of
/// each route has no label and is excluded.
pub fn training_set(
    rows: &[FeatureRow],
    encoder: &RouteEncoder,
) -> Result<(FeatureMatrix, Vec<f64>), ForecastError> {
    let labelled = rows.iter().filter(|r| r.is_labelled()).cloned().collect_vec();
    let targets = labelled
        .iter()
        .filter_map(|r| r.target_next_hour)
        .collect_vec();
    let matrix = FeatureMatrix::from_rows(&labelled, encoder)?;
    Ok((matrix, targets))
}
