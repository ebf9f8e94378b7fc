//! Average True Range (Wilder).
//!
//! TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|), defined from bar 1.
//! ATR[n] = mean(TR[1..=n]); ATR[i] = (ATR[i-1]*(n-1) + TR[i]) / n.
//! Warmup: bars 0..n are invalid. Needs at least n+1 bars.

use crate::domain::error::IndicatorFault;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, IndicatorFault> {
    let minimum = period + 1;
    if period == 0 || bars.len() < minimum {
        return Err(IndicatorFault::InsufficientHistory {
            bars: bars.len(),
            minimum,
        });
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut atr = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        if i == period {
            atr = (1..=period)
                .map(|j| bars[j].true_range(bars[j - 1].close))
                .sum::<f64>()
                / period as f64;
        } else {
            let tr = bar.true_range(bars[i - 1].close);
            atr = (atr * (period - 1) as f64 + tr) / period as f64;
        }

        if !atr.is_finite() {
            return Err(IndicatorFault::NonFinite { index: i });
        }
        values.push(IndicatorPoint::simple(bar.date, atr));
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    })
}
