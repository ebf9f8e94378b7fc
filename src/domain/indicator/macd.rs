//! MACD line as stored in `crypto_data`.
//!
//! MACD = EMA(slow) - EMA(fast), with slow = 20 and fast = 9 and both EMAs
//! seeded with the first close. This is not the 12/26/9 MACD: there is no
//! signal line or histogram, and the sign is inverted relative to the usual
//! fast-minus-slow convention. Stored history depends on this exact formula.

use crate::domain::indicator::ema::ema_raw_values;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_SLOW: usize = 20;
pub const DEFAULT_FAST: usize = 9;

pub fn calculate_macd(bars: &[OhlcvBar], slow: usize, fast: usize) -> IndicatorSeries {
    let ema_slow = ema_raw_values(bars, slow);
    let ema_fast = ema_raw_values(bars, fast);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| match (ema_slow[i], ema_fast[i]) {
            (Some(s), Some(f)) => IndicatorPoint::simple(bar.date, s - f),
            _ => IndicatorPoint::invalid(bar.date),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Macd { slow, fast },
        values,
    }
}
