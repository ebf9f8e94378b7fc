//! Volume-Weighted Average Price, anchored to each calendar day.
//!
//! VWAP[i] = sum(TP * V) / sum(V) over bars sharing bar i's date, up to i.
//! With daily bars every anchor holds a single bar. The feed carries no
//! volume, so the denominator is zero and the calculation faults.

use crate::domain::error::IndicatorFault;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_vwap(bars: &[OhlcvBar]) -> Result<IndicatorSeries, IndicatorFault> {
    let mut values = Vec::with_capacity(bars.len());
    let mut cum_pv = 0.0;
    let mut cum_vol = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 || bars[i - 1].date != bar.date {
            cum_pv = 0.0;
            cum_vol = 0.0;
        }
        cum_pv += bar.typical_price() * bar.volume;
        cum_vol += bar.volume;

        if cum_vol == 0.0 {
            return Err(IndicatorFault::DivisionByZero { index: i });
        }
        values.push(IndicatorPoint::simple(bar.date, cum_pv / cum_vol));
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Vwap,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(day: u32, high: f64, low: f64, close: f64, volume: f64) -> OhlcvBar {
        OhlcvBar {
            asset: "TEST".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume,
        }
    }

    #[test]
    fn vwap_single_bar_per_day_is_typical_price() {
        let bars = vec![make_bar(1, 12.0, 9.0, 9.0, 100.0), make_bar(2, 15.0, 12.0, 15.0, 50.0)];
        let series = calculate_vwap(&bars).unwrap();
        assert!((series.simple_at(0).unwrap() - 10.0).abs() < 1e-12);
        assert!((series.simple_at(1).unwrap() - 14.0).abs() < 1e-12);
    }

    #[test]
    fn vwap_accumulates_within_a_day() {
        let bars = vec![make_bar(1, 12.0, 9.0, 9.0, 100.0), make_bar(1, 15.0, 12.0, 15.0, 100.0)];
        let series = calculate_vwap(&bars).unwrap();
        // (10*100 + 14*100) / 200
        assert!((series.simple_at(1).unwrap() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn vwap_zero_volume_faults() {
        let bars = vec![make_bar(1, 12.0, 9.0, 9.0, 0.0), make_bar(2, 15.0, 12.0, 15.0, 0.0)];
        assert_eq!(
            calculate_vwap(&bars).unwrap_err(),
            IndicatorFault::DivisionByZero { index: 0 }
        );
    }

    #[test]
    fn vwap_empty() {
        let series = calculate_vwap(&[]).unwrap();
        assert!(series.values.is_empty());
    }
}
