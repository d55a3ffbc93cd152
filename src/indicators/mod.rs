// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators feeding the
// decision rules.  The individual calculators return only their defined
// values; `IndicatorSet` re-aligns them index-for-index with the price series,
// using `None` for positions still inside an indicator's warm-up.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::market_data::PriceSeries;

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD: f64 = 2.0;
pub const MA_PERIOD: usize = 20;

/// Largest warm-up window in the set; the latest value of every indicator is
/// defined once the series reaches this length.
pub const MAX_WINDOW: usize = 20;

/// The fixed set of indicators, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IndicatorKind {
    Rsi,
    Macd,
    BollingerHigh,
    BollingerLow,
    Sma20,
    Ema20,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 6] = [
        Self::Rsi,
        Self::Macd,
        Self::BollingerHigh,
        Self::BollingerLow,
        Self::Sma20,
        Self::Ema20,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
            Self::BollingerHigh => "Bollinger High",
            Self::BollingerLow => "Bollinger Low",
            Self::Sma20 => "SMA 20",
            Self::Ema20 => "EMA 20",
        }
    }

    /// Closes required before the first defined value.
    pub fn warmup(&self) -> usize {
        match self {
            Self::Rsi => RSI_PERIOD,
            Self::Macd => 1,
            Self::BollingerHigh | Self::BollingerLow => BOLLINGER_PERIOD,
            Self::Sma20 | Self::Ema20 => MA_PERIOD,
        }
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Indicator values aligned with the price series they were computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub bollinger_high: Vec<Option<f64>>,
    pub bollinger_low: Vec<Option<f64>>,
    pub sma_20: Vec<Option<f64>>,
    pub ema_20: Vec<Option<f64>>,
}

/// Latest value of each indicator; `None` means still warming up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub bollinger_high: Option<f64>,
    pub bollinger_low: Option<f64>,
    pub sma_20: Option<f64>,
    pub ema_20: Option<f64>,
}

impl IndicatorSet {
    /// Recompute every indicator over the full series.
    pub fn compute(series: &PriceSeries) -> Self {
        let closes = series.closes();
        let n = closes.len();

        let bands = bollinger::calculate_bollinger_series(&closes, BOLLINGER_PERIOD, BOLLINGER_STD);
        let upper: Vec<f64> = bands.iter().map(|b| b.upper).collect();
        let lower: Vec<f64> = bands.iter().map(|b| b.lower).collect();

        Self {
            rsi: align(rsi::calculate_rsi(&closes, RSI_PERIOD), RSI_PERIOD - 1, n),
            macd: align(macd::calculate_macd(&closes, MACD_FAST, MACD_SLOW), 0, n),
            bollinger_high: align(upper, BOLLINGER_PERIOD - 1, n),
            bollinger_low: align(lower, BOLLINGER_PERIOD - 1, n),
            sma_20: align(sma::calculate_sma(&closes, MA_PERIOD), MA_PERIOD - 1, n),
            ema_20: align(
                ema::calculate_ema(&closes, MA_PERIOD).into_iter().skip(MA_PERIOD - 1).collect(),
                MA_PERIOD - 1,
                n,
            ),
        }
    }

    pub fn series(&self, kind: IndicatorKind) -> &[Option<f64>] {
        match kind {
            IndicatorKind::Rsi => &self.rsi,
            IndicatorKind::Macd => &self.macd,
            IndicatorKind::BollingerHigh => &self.bollinger_high,
            IndicatorKind::BollingerLow => &self.bollinger_low,
            IndicatorKind::Sma20 => &self.sma_20,
            IndicatorKind::Ema20 => &self.ema_20,
        }
    }

    pub fn latest(&self, kind: IndicatorKind) -> Option<f64> {
        self.series(kind).last().copied().flatten()
    }

    pub fn snapshot(&self) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi: self.latest(IndicatorKind::Rsi),
            macd: self.latest(IndicatorKind::Macd),
            bollinger_high: self.latest(IndicatorKind::BollingerHigh),
            bollinger_low: self.latest(IndicatorKind::BollingerLow),
            sma_20: self.latest(IndicatorKind::Sma20),
            ema_20: self.latest(IndicatorKind::Ema20),
        }
    }

    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    /// `InsufficientData` when any indicator's latest value is still
    /// undefined.  Never fatal: those indicators vote NEUTRAL.
    pub fn check_warmup(&self) -> Result<()> {
        let need = IndicatorKind::ALL
            .iter()
            .filter(|kind| self.latest(**kind).is_none())
            .map(|kind| kind.warmup())
            .max();

        match need {
            Some(need) => Err(PipelineError::InsufficientData {
                have: self.len(),
                need,
            }),
            None => Ok(()),
        }
    }
}

/// Place `values` at `start..` of a `len`-long vector, `None` elsewhere.
fn align(values: Vec<f64>, start: usize, len: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; len];
    for (slot, value) in out.iter_mut().skip(start).zip(values) {
        *slot = Some(value);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    use crate::market_data::series::PricePoint;

    fn series_of(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                timestamp: start + Duration::days(i as i64),
                close,
            })
            .collect();
        PriceSeries::from_points(points).unwrap()
    }

    #[test]
    fn every_indicator_is_aligned_with_the_series() {
        let set = IndicatorSet::compute(&series_of(&[1.1; 37]));
        for kind in IndicatorKind::ALL {
            assert_eq!(set.series(kind).len(), 37, "{kind} misaligned");
        }
    }

    #[test]
    fn warmup_entries_are_undefined() {
        let closes: Vec<f64> = (0..30).map(|i| 1.0 + i as f64 * 0.001).collect();
        let set = IndicatorSet::compute(&series_of(&closes));
        assert!(set.rsi[12].is_none());
        assert!(set.rsi[13].is_some());
        assert!(set.sma_20[18].is_none());
        assert!(set.sma_20[19].is_some());
        assert!(set.ema_20[18].is_none());
        assert!(set.ema_20[19].is_some());
        assert!(set.bollinger_high[18].is_none());
        assert!(set.bollinger_low[19].is_some());
        assert!(set.macd[0].is_some());
    }

    #[test]
    fn latest_is_defined_at_max_window() {
        let closes: Vec<f64> = (0..MAX_WINDOW).map(|i| 1.0 + (i % 3) as f64 * 0.01).collect();
        let set = IndicatorSet::compute(&series_of(&closes));
        for kind in IndicatorKind::ALL {
            assert!(set.latest(kind).is_some(), "{kind} undefined at length {MAX_WINDOW}");
        }
        assert!(set.check_warmup().is_ok());
    }

    #[test]
    fn length_nineteen_reports_insufficient_data() {
        let closes: Vec<f64> = (0..19).map(|i| 1.0 + i as f64 * 0.001).collect();
        let set = IndicatorSet::compute(&series_of(&closes));
        let snap = set.snapshot();
        assert!(snap.rsi.is_some());
        assert!(snap.macd.is_some());
        assert!(snap.bollinger_high.is_none());
        assert!(snap.bollinger_low.is_none());
        assert!(snap.sma_20.is_none());
        assert!(snap.ema_20.is_none());
        assert!(matches!(
            set.check_warmup(),
            Err(PipelineError::InsufficientData { have: 19, need: 20 })
        ));
    }

    #[test]
    fn single_point_does_not_panic() {
        let set = IndicatorSet::compute(&series_of(&[1.2]));
        assert_eq!(set.len(), 1);
        assert!(set.latest(IndicatorKind::Rsi).is_none());
        assert_eq!(set.latest(IndicatorKind::Macd), Some(0.0));
    }

    #[test]
    fn constant_series_collapses_bands_and_averages() {
        let set = IndicatorSet::compute(&series_of(&[1.10; 20]));
        let snap = set.snapshot();
        assert_eq!(snap.bollinger_high, Some(1.10));
        assert_eq!(snap.bollinger_low, Some(1.10));
        assert_eq!(snap.sma_20, Some(1.10));
        assert_eq!(snap.ema_20, Some(1.10));
        assert_eq!(snap.macd, Some(0.0));
        assert_eq!(snap.rsi, Some(50.0));
    }

    #[test]
    fn rising_series_drives_rsi_up_and_macd_positive() {
        let closes: Vec<f64> = (0..40).map(|i| 1.05 + i as f64 * 0.002).collect();
        let snap = IndicatorSet::compute(&series_of(&closes)).snapshot();
        assert!((snap.rsi.unwrap() - 100.0).abs() < 1e-9);
        assert!(snap.macd.unwrap() > 0.0);
    }

    #[test]
    fn rsi_is_defined_at_fourteen_points() {
        let closes: Vec<f64> = (0..14).map(|i| 1.10 + (i % 2) as f64 * 0.002).collect();
        let set = IndicatorSet::compute(&series_of(&closes));
        assert!(set.latest(IndicatorKind::Rsi).is_some());
        assert!(set.rsi[12].is_none());
    }

    #[test]
    fn ema_20_matches_recursive_reference() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 1.10 + ((i * 7) % 13) as f64 * 0.0004 - (i % 3) as f64 * 0.0003)
            .collect();
        let set = IndicatorSet::compute(&series_of(&closes));

        let k = 2.0 / 21.0;
        let mut reference = closes[0];
        let mut expected = vec![None; closes.len()];
        for (i, &c) in closes.iter().enumerate() {
            if i > 0 {
                reference += k * (c - reference);
            }
            if i >= MA_PERIOD - 1 {
                expected[i] = Some(reference);
            }
        }

        assert_eq!(set.ema_20, expected);
    }

    #[test]
    fn compute_is_deterministic() {
        let closes: Vec<f64> = (0..60).map(|i| 1.1 + ((i * 7) % 11) as f64 * 0.0013).collect();
        let series = series_of(&closes);
        assert_eq!(IndicatorSet::compute(&series), IndicatorSet::compute(&series));
    }
}
