// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Upper band = SMA + k*σ, lower band = SMA - k*σ, with σ the population
// standard deviation of the trailing window.

use super::sma::mean;

/// Upper and lower band of one full window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub lower: f64,
}

/// Bollinger Bands for every full window, starting at index `period - 1`.
///
/// Stops at the first non-finite window so the output stays contiguous.
pub fn calculate_bollinger_series(closes: &[f64], period: usize, num_std: f64) -> Vec<BollingerBands> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }
    closes
        .windows(period)
        .map_while(|window| bands(window, num_std))
        .collect()
}

fn bands(window: &[f64], num_std: f64) -> Option<BollingerBands> {
    let middle = mean(window)?;
    let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / window.len() as f64;
    let spread = num_std * variance.sqrt();

    let upper = middle + spread;
    let lower = middle - spread;
    (upper.is_finite() && lower.is_finite()).then_some(BollingerBands { upper, lower })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last(closes: &[f64], period: usize) -> BollingerBands {
        *calculate_bollinger_series(closes, period, 2.0).last().unwrap()
    }

    #[test]
    fn bands_straddle_the_mean() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let bb = last(&closes, 20);
        assert!(bb.upper > 10.5 && bb.lower < 10.5);
        assert!(((bb.upper + bb.lower) / 2.0 - 10.5).abs() < 1e-10);
    }

    #[test]
    fn uses_population_std() {
        // Window [2, 4, 4, 4, 5, 5, 7, 9]: mean 5, population σ = 2.
        let bb = last(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        assert!((bb.upper - 9.0).abs() < 1e-12);
        assert!((bb.lower - 1.0).abs() < 1e-12);
    }

    #[test]
    fn insufficient_data() {
        assert!(calculate_bollinger_series(&[1.0, 2.0, 3.0], 20, 2.0).is_empty());
        assert!(calculate_bollinger_series(&[1.0, 2.0, 3.0], 0, 2.0).is_empty());
    }

    #[test]
    fn flat_window_collapses() {
        let bb = last(&[1.10; 20], 20);
        assert_eq!(bb.upper, 1.10);
        assert_eq!(bb.lower, 1.10);
    }

    #[test]
    fn one_result_per_window() {
        let closes: Vec<f64> = (1..=25).map(|x| x as f64).collect();
        let series = calculate_bollinger_series(&closes, 20, 2.0);
        assert_eq!(series.len(), 6);
        assert_eq!(series[5], last(&closes[5..], 20));
    }
}
