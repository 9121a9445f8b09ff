//! Simple rolling mean.

/// Mean of each trailing window of `period` values. The first `period - 1`
/// positions have no full window and are `None`. All `None` when `period == 0`.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let mut out = vec![None; values.len()];
    for (end, window) in values.windows(period).enumerate() {
        out[end + period - 1] = Some(window.iter().sum::<f64>() / period as f64);
    }
    out
}
