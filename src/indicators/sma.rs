// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// SMA_t = (close_{t-period+1} + ... + close_t) / period
//
// Means are taken relative to the first element of the window, so a constant
// window averages back to exactly that constant.
// =============================================================================

/// Arithmetic mean of `window`, computed as `x0 + mean(x - x0)`.
///
/// Returns `None` for an empty slice.
pub fn mean(window: &[f64]) -> Option<f64> {
    let (&first, _) = window.split_first()?;
    let shifted: f64 = window.iter().map(|x| x - first).sum();
    Some(first + shifted / window.len() as f64)
}

/// Compute the SMA series for `closes` over `period`.
///
/// Each output element corresponds to a close starting at index `period - 1`.
/// Returns an empty `Vec` when `period == 0` or the input is too short.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }
    closes.windows(period).filter_map(mean).collect()
}
