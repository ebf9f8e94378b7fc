//! Stochastic oscillator (slow %K / %D).
//!
//! raw[i] = 100 * (C[i] - LL) / (HH - LL) over the last k_period bars
//! %K = SMA(smooth_k) of raw, %D = SMA(d_period) of %K.
//!
//! A window with HH == LL has no defined raw value; that bar and every
//! smoothed value whose window touches it stay invalid. The rest of the
//! series is unaffected.

use crate::domain::error::IndicatorFault;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_SMOOTH_K: usize = 3;
pub const DEFAULT_D_PERIOD: usize = 3;

#[derive(Debug, Clone)]
pub struct StochasticSeries {
    pub k: IndicatorSeries,
    pub d: IndicatorSeries,
}

pub fn calculate_stochastic(
    bars: &[OhlcvBar],
    k_period: usize,
    smooth_k: usize,
    d_period: usize,
) -> Result<StochasticSeries, IndicatorFault> {
    let minimum = (k_period + smooth_k + d_period).saturating_sub(2);
    if k_period == 0 || smooth_k == 0 || d_period == 0 || bars.len() < minimum {
        return Err(IndicatorFault::InsufficientHistory {
            bars: bars.len(),
            minimum,
        });
    }

    let raw: Vec<Option<f64>> = (0..bars.len())
        .map(|i| {
            if i + 1 < k_period {
                return None;
            }
            let window = &bars[i + 1 - k_period..=i];
            let hh = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let ll = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            let range = hh - ll;
            if range == 0.0 {
                None
            } else {
                Some(100.0 * (bars[i].close - ll) / range)
            }
        })
        .collect();

    let k = rolling_mean(&raw, smooth_k);
    let d = rolling_mean(&k, d_period);
    let indicator_type = IndicatorType::Stochastic {
        k_period,
        smooth_k,
        d_period,
    };

    Ok(StochasticSeries {
        k: to_series(bars, &k, indicator_type.clone()),
        d: to_series(bars, &d, indicator_type),
    })
}

fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            values[i + 1 - period..=i]
                .iter()
                .copied()
                .sum::<Option<f64>>()
                .map(|sum| sum / period as f64)
        })
        .collect()
}

fn to_series(bars: &[OhlcvBar], values: &[Option<f64>], indicator_type: IndicatorType) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type,
        values: bars
            .iter()
            .zip(values)
            .map(|(bar, v)| match v {
                Some(v) => IndicatorPoint::simple(bar.date, *v),
                None => IndicatorPoint::invalid(bar.date),
            })
            .collect(),
    }
}
