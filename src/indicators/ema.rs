// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_0      = close_0
//   EMA_t      = EMA_{t-1} + multiplier * (close_t - EMA_{t-1})
//
// The update is written in its incremental form so that a close equal to the
// previous EMA leaves it bit-for-bit unchanged.
// =============================================================================

/// Compute the EMA of `closes`, one value per close, seeded at the first close.
///
/// Callers that need a warm-up (EMA 20) mask the leading entries themselves;
/// the MACD lines use every value.
///
/// # Edge cases
/// - `period == 0` or empty input => empty vec
/// - A non-finite intermediate value stops the series.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return Vec::new();
    }
    let Some((&first, rest)) = closes.split_first() else {
        return Vec::new();
    };
    if !first.is_finite() {
        return Vec::new();
    }

    let k = 2.0 / (period + 1) as f64;
    let mut result = Vec::with_capacity(closes.len());
    result.push(first);

    let mut prev = first;
    for &close in rest {
        let ema = prev + k * (close - prev);
        if !ema.is_finite() {
            // Downstream consumers should not trust a broken series.
            break;
        }
        result.push(ema);
        prev = ema;
    }
    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert!(calculate_ema(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn ema_known_values() {
        // period 3 => multiplier 0.5
        // 1.0, 1.0 + 0.5*(2-1) = 1.5, 1.5 + 0.5*(3-1.5) = 2.25, 2.25 + 0.5*(4-2.25) = 3.125
        let ema = calculate_ema(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(ema, vec![1.0, 1.5, 2.25, 3.125]);
    }

    #[test]
    fn ema_twenty_hand_computed() {
        // multiplier 2/21; five closes after a flat start.
        let closes = [1.1000, 1.1000, 1.1021, 1.0979, 1.1042];
        let k = 2.0 / 21.0;
        let mut expected = 1.1000;
        for &c in &closes[1..] {
            expected += k * (c - expected);
        }
        let ema = calculate_ema(&closes, 20);
        assert_eq!(ema.len(), 5);
        assert!((ema[4] - expected).abs() < 1e-15);
        // 1.1000 -> 1.1000 -> 1.1002 -> 1.09998095... -> 1.10038277...
        assert!((ema[4] - 1.100_382_77).abs() < 1e-8);
    }

    #[test]
    fn ema_handles_nan_in_input() {
        let ema = calculate_ema(&[1.0, 2.0, f64::NAN, 5.0], 3);
        assert_eq!(ema, vec![1.0, 1.5]);
    }

    #[test]
    fn ema_constant_series_is_exact() {
        let ema = calculate_ema(&[1.1; 40], 20);
        assert_eq!(ema.len(), 40);
        assert!(ema.iter().all(|&v| v == 1.1));
    }

    #[test]
    fn ema_lags_a_rising_series() {
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ema = calculate_ema(&closes, 12);
        assert_eq!(ema.len(), 10);
        assert!(ema[9] < 10.0 && ema[9] > ema[8]);
    }
}
