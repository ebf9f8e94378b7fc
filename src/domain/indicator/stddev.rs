//! Rolling sample standard deviation of close, used by the Bollinger bands.
//!
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / (n - 1))
//! Divides by n-1 (sample, not population). Undefined for n < 2 and for the
//! first (n-1) bars.

use crate::domain::ohlcv::OhlcvBar;

/// `(mean, sample stddev)` of the `period` closes ending at `index`.
pub(crate) fn window_stddev(bars: &[OhlcvBar], index: usize, period: usize) -> Option<(f64, f64)> {
    if period < 2 || index + 1 < period || index >= bars.len() {
        return None;
    }

    let window = &bars[index + 1 - period..=index];
    let mean = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
    let variance = window
        .iter()
        .map(|b| {
            let diff = b.close - mean;
            diff * diff
        })
        .sum::<f64>()
        / (period - 1) as f64;

    Some((mean, variance.sqrt()))
}
