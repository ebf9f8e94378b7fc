//! OHLCV bars derived from a close-only daily series.
//!
//! The feed only carries closes, so the remaining fields are synthesized:
//! open is the prior close, high/low span the prior and current close, and
//! volume is always zero.

use crate::domain::price::PricePoint;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub asset: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Build bars from consecutive points. The first point has no prior close
/// and yields no bar, so the output is one shorter than the input.
pub fn derive_bars(points: &[PricePoint]) -> Vec<OhlcvBar> {
    points
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            OhlcvBar {
                asset: cur.asset.clone(),
                date: cur.date,
                open: prev.close,
                high: prev.close.max(cur.close),
                low: prev.close.min(cur.close),
                close: cur.close,
                volume: 0.0,
            }
        })
        .collect()
}
