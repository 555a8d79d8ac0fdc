//! shift and rolling-window operations over one route's chronologically sorted series.
//! the value produced for index i only reads indices <= i, except [`lead`], which builds
//! the label and must never be used as a model input.

/// value `k` positions earlier, None for the first `k` positions.
pub fn lag(values: &[f64], k: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| if i >= k { Some(values[i - k]) } else { None })
        .collect()
}

/// value `k` positions later, None for the last `k` positions.
pub fn lead(values: &[f64], k: usize) -> Vec<Option<f64>> {
    (0..values.len()).map(|i| values.get(i + k).copied()).collect()
}

/// trailing simple moving average over at most `window` values ending at (and including)
/// each position. early positions average over however many values exist.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
