//! gap filling and outlier handling for a single route's demand series.
use chrono::NaiveDateTime;
use itertools::Itertools;
use ordered_float::OrderedFloat;

use super::FeatureError;

/// fills missing values of a chronologically sorted series. interior gaps are linearly
/// interpolated by elapsed time between the nearest valid neighbours; leading and trailing
/// gaps repeat the nearest valid value. a series without any valid value is returned unchanged.
pub fn interpolate_in_time(series: &[(NaiveDateTime, Option<f64>)]) -> Vec<Option<f64>> {
    let n = series.len();
    let mut prev_valid: Vec<Option<usize>> = vec![None; n];
    let mut next_valid: Vec<Option<usize>> = vec![None; n];
    let mut last = None;
    for (idx, (_, value)) in series.iter().enumerate() {
        if value.is_some() {
            last = Some(idx);
        }
        prev_valid[idx] = last;
    }
    last = None;
    for (idx, (_, value)) in series.iter().enumerate().rev() {
        if value.is_some() {
            last = Some(idx);
        }
        next_valid[idx] = last;
    }

    series
        .iter()
        .enumerate()
        .map(|(idx, (timestamp, value))| {
            if value.is_some() {
                return *value;
            }
            match (prev_valid[idx], next_valid[idx]) {
                (None, None) => None,
                (Some(p), None) => series[p].1,
                (None, Some(n)) => series[n].1,
                (Some(p), Some(n)) => {
                    let (t0, v0) = series[p];
                    let (t1, v1) = series[n];
                    let (v0, v1) = (v0?, v1?);
                    let span = (t1 - t0).num_seconds() as f64;
                    if span <= 0.0 {
                        return Some(v0);
                    }
                    let elapsed = (*timestamp - t0).num_seconds() as f64;
                    Some(v0 + (v1 - v0) * elapsed / span)
                }
            }
        })
        .collect_vec()
}

/// median of the values, None for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// quantile with linear interpolation between the two nearest order statistics.
/// None for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = values.iter().map(|v| OrderedFloat(*v)).sorted().collect_vec();
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    let (a, b) = (sorted[lower].0, sorted[upper].0);
    Some(a + (b - a) * fraction)
}

/// cleans the demand series of one route: interpolation first, then the route median
/// for anything left. errors if the route has no valid value to take a median from.
pub fn clean_route_series(
    route: &str,
    series: &[(NaiveDateTime, Option<f64>)],
) -> Result<Vec<f64>, FeatureError> {
    let valid = series.iter().filter_map(|(_, v)| *v).collect_vec();
    let route_median = median(&valid).ok_or_else(|| FeatureError::NoDemandHistory {
        route: route.to_string(),
    })?;
    let missing = series.len() - valid.len();
    if missing > 0 {
        log::debug!("route '{route}': filling {missing} missing demand values");
    }
    let filled = interpolate_in_time(series)
        .into_iter()
        .map(|v| v.unwrap_or(route_median))
        .collect_vec();
    Ok(filled)
}

/// clips a value into [0, upper].
pub fn clip(value: f64, upper: f64) -> f64 {
    value.min(upper).max(0.0)
}
