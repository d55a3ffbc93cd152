use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single dated closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Time-ascending closing prices for one currency pair.
///
/// Invariants: at least one point, timestamps non-decreasing.  The only
/// constructor sorts its input, so a `PriceSeries` is always valid and
/// never changes after it is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
    /// `true` when the series was replicated from a single current rate.
    synthetic: bool,
}

impl PriceSeries {
    /// Build a series from points in any order.
    ///
    /// The sort is stable: points sharing a timestamp keep their encounter
    /// order and are not deduplicated.
    pub fn from_points(mut points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(PipelineError::NoData("series has no points".into()));
        }
        points.sort_by_key(|p| p.timestamp);
        Ok(Self {
            points,
            synthetic: false,
        })
    }

    /// Replicate one rate `len` times at the same timestamp.
    pub fn synthetic(close: f64, timestamp: DateTime<Utc>, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(PipelineError::NoData("synthetic series length is zero".into()));
        }
        Ok(Self {
            points: vec![PricePoint { timestamp, close }; len],
            synthetic: true,
        })
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn latest(&self) -> &PricePoint {
        // Non-empty by construction.
        &self.points[self.points.len() - 1]
    }

    pub fn latest_close(&self) -> f64 {
        self.latest().close
    }

    /// The most recent `count` points (oldest-first), for display only.
    pub fn tail(&self, count: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(count);
        &self.points[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_is_no_data() {
        assert!(matches!(
            PriceSeries::from_points(Vec::new()),
            Err(PipelineError::NoData(_))
        ));
    }

    #[test]
    fn points_are_sorted_ascending() {
        let series = PriceSeries::from_points(vec![
            PricePoint { timestamp: at(3), close: 1.3 },
            PricePoint { timestamp: at(1), close: 1.1 },
            PricePoint { timestamp: at(2), close: 1.2 },
        ])
        .unwrap();
        assert_eq!(series.closes(), vec![1.1, 1.2, 1.3]);
        assert!((series.latest_close() - 1.3).abs() < 1e-12);
        assert!(!series.is_synthetic());
    }

    #[test]
    fn duplicate_timestamps_keep_encounter_order() {
        let series = PriceSeries::from_points(vec![
            PricePoint { timestamp: at(2), close: 2.0 },
            PricePoint { timestamp: at(1), close: 1.0 },
            PricePoint { timestamp: at(2), close: 2.5 },
        ])
        .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.0, 2.0, 2.5]);
    }

    #[test]
    fn synthetic_series_is_flagged() {
        let series = PriceSeries::synthetic(1.08, at(1), 100).unwrap();
        assert_eq!(series.len(), 100);
        assert!(series.is_synthetic());
        assert!(series.closes().iter().all(|&c| c == 1.08));
    }

    #[test]
    fn tail_windows_without_copying_more_than_available() {
        let series = PriceSeries::synthetic(1.0, at(1), 5).unwrap();
        assert_eq!(series.tail(3).len(), 3);
        assert_eq!(series.tail(50).len(), 5);
    }
}
