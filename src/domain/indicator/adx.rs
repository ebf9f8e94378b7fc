//! Average Directional Index (Wilder).
//!
//! For i >= 1:
//!   up = H[i] - H[i-1], down = L[i-1] - L[i]
//!   +DM = up if up > down and up > 0, else 0
//!   -DM = down if down > up and down > 0, else 0
//! TR, +DM and -DM are Wilder-smoothed: the first value (bar n) is the sum of
//! bars 1..=n, then S[i] = S[i-1] - S[i-1]/n + x[i].
//!   +DI = 100 * S(+DM) / S(TR), -DI = 100 * S(-DM) / S(TR)
//!   DX  = 100 * |+DI - -DI| / (+DI + -DI)
//! ADX[2n-1] = mean(DX[n..=2n-1]); ADX[i] = (ADX[i-1]*(n-1) + DX[i]) / n.
//!
//! A zero smoothed true range or a zero DI sum leaves DX undefined, and since
//! every later ADX value depends on it the whole series faults.

use crate::domain::error::IndicatorFault;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_adx(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, IndicatorFault> {
    let minimum = 2 * period;
    if period == 0 || bars.len() < minimum {
        return Err(IndicatorFault::InsufficientHistory {
            bars: bars.len(),
            minimum,
        });
    }

    let n = period as f64;
    let mut s_tr = 0.0;
    let mut s_plus = 0.0;
    let mut s_minus = 0.0;
    let mut dx = vec![0.0; bars.len()];

    for i in 1..bars.len() {
        let tr = bars[i].true_range(bars[i - 1].close);
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
        let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };

        if i <= period {
            s_tr += tr;
            s_plus += plus_dm;
            s_minus += minus_dm;
        } else {
            s_tr = s_tr - s_tr / n + tr;
            s_plus = s_plus - s_plus / n + plus_dm;
            s_minus = s_minus - s_minus / n + minus_dm;
        }

        if i < period {
            continue;
        }

        if s_tr == 0.0 {
            return Err(IndicatorFault::DivisionByZero { index: i });
        }
        let plus_di = 100.0 * s_plus / s_tr;
        let minus_di = 100.0 * s_minus / s_tr;
        let di_sum = plus_di + minus_di;
        if di_sum == 0.0 {
            return Err(IndicatorFault::DivisionByZero { index: i });
        }
        dx[i] = 100.0 * (plus_di - minus_di).abs() / di_sum;
    }

    let first = minimum - 1;
    let mut values = Vec::with_capacity(bars.len());
    let mut adx = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < first {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        adx = if i == first {
            dx[period..=first].iter().sum::<f64>() / n
        } else {
            (adx * (n - 1.0) + dx[i]) / n
        };

        if !adx.is_finite() {
            return Err(IndicatorFault::NonFinite { index: i });
        }
        values.push(IndicatorPoint::simple(bar.date, adx));
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Adx(period),
        values,
    })
}
