//! Exponential Moving Average of close.
//!
//! k = 2/(n+1). Seeded with the first close, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). There is no SMA seed window, so every
//! bar is valid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values: bars
            .iter()
            .zip(ema_raw_values(bars, period))
            .map(|(bar, ema)| match ema {
                Some(v) => IndicatorPoint::simple(bar.date, v),
                None => IndicatorPoint::invalid(bar.date),
            })
            .collect(),
    }
}

/// Raw EMA values, one per bar; all `None` when `period` is zero.
pub(crate) fn ema_raw_values(bars: &[OhlcvBar], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; bars.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            ema = if i == 0 {
                bar.close
            } else {
                bar.close * k + ema * (1.0 - k)
            };
            Some(ema)
        })
        .collect()
}
