// =============================================================================
// Relative Strength Index (RSI)
// =============================================================================
//
// Up and down moves are tracked as running averages with weight 1/period:
//
//   change_0 = 0,  change_t = close_t - close_{t-1}
//   up_t     = up_{t-1}   + (max(change_t, 0)  - up_{t-1})   / period
//   down_t   = down_{t-1} + (max(-change_t, 0) - down_{t-1}) / period
//   RSI_t    = 100 - 100 / (1 + up_t / down_t)
//
// Both averages start at zero on the first close.  The first `period - 1`
// positions are warm-up and produce no value.
// =============================================================================

/// RSI for every close from index `period - 1` onward.
///
/// Returns an empty `Vec` for `period == 0` or fewer than `period` closes.
/// A non-finite value ends the series early.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let weight = 1.0 / period as f64;
    let mut avg_up = 0.0_f64;
    let mut avg_down = 0.0_f64;
    let mut out = Vec::with_capacity(closes.len() + 1 - period);

    for (idx, change) in price_changes(closes).enumerate() {
        let up = change.max(0.0);
        let down = (-change).max(0.0);
        avg_up += weight * (up - avg_up);
        avg_down += weight * (down - avg_down);

        if idx + 1 < period {
            continue;
        }
        match strength_index(avg_up, avg_down) {
            Some(rsi) => out.push(rsi),
            None => break,
        }
    }

    out
}

/// Close-to-close changes, with the first close contributing no move.
fn price_changes(closes: &[f64]) -> impl Iterator<Item = f64> + '_ {
    std::iter::once(0.0).chain(closes.windows(2).map(|w| w[1] - w[0]))
}

/// No movement at all reads as 50; no down moves reads as 100.
fn strength_index(avg_up: f64, avg_down: f64) -> Option<f64> {
    let rsi = match (avg_up == 0.0, avg_down == 0.0) {
        (true, true) => 50.0,
        (_, true) => 100.0,
        _ => 100.0 - 100.0 / (1.0 + avg_up / avg_down),
    };
    rsi.is_finite().then_some(rsi)
}
