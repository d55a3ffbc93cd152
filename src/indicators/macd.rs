// =============================================================================
// MACD line
// =============================================================================
//
// MACD_t = EMA_fast_t - EMA_slow_t
//
// Only the MACD line is produced; the signal line and histogram are not used
// by the decision rules.  Both EMAs start at the first close, so the line has
// a value for every close and is exactly zero on a constant series.
// =============================================================================

use super::ema::calculate_ema;

/// Compute the MACD line, one value per close.
///
/// Returns an empty `Vec` when either period is zero or `fast >= slow`.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize) -> Vec<f64> {
    if fast == 0 || fast >= slow {
        return Vec::new();
    }

    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_invalid_periods() {
        let closes = vec![1.0; 30];
        assert!(calculate_macd(&closes, 0, 26).is_empty());
        assert!(calculate_macd(&closes, 26, 12).is_empty());
    }

    #[test]
    fn macd_constant_is_exactly_zero() {
        let closes = vec![1.10; 20];
        let macd = calculate_macd(&closes, 12, 26);
        assert_eq!(macd.len(), 20);
        assert!(macd.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn macd_rising_is_positive() {
        let closes: Vec<f64> = (0..40).map(|i| 1.0 + i as f64 * 0.01).collect();
        let macd = calculate_macd(&closes, 12, 26);
        assert!(*macd.last().unwrap() > 0.0);
    }

    #[test]
    fn macd_falling_is_negative() {
        let closes: Vec<f64> = (0..40).map(|i| 2.0 - i as f64 * 0.01).collect();
        let macd = calculate_macd(&closes, 12, 26);
        assert!(*macd.last().unwrap() < 0.0);
    }
}
