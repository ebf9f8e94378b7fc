//! RSI (Relative Strength Index) over a simple rolling mean of price changes.
//!
//! avg_gain / avg_loss: plain mean of the last n gains / losses (no Wilder
//! smoothing). RSI = 100 - (100 / (1 + avg_gain / avg_loss)).
//! If avg_loss == 0 and avg_gain > 0: RSI = 100.
//! If both are 0 the ratio is undefined and the point is invalid.
//!
//! Warmup: the first bar has no change, so bars 0..n are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if period == 0 || i < period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        let mut gain_sum = 0.0;
        let mut loss_sum = 0.0;
        for j in (i + 1 - period)..=i {
            let change = bars[j].close - bars[j - 1].close;
            if change > 0.0 {
                gain_sum += change;
            } else if change < 0.0 {
                loss_sum -= change;
            }
        }

        let avg_gain = gain_sum / period as f64;
        let avg_loss = loss_sum / period as f64;

        let point = if avg_loss == 0.0 && avg_gain == 0.0 {
            IndicatorPoint::invalid(bar.date)
        } else if avg_loss == 0.0 {
            IndicatorPoint::simple(bar.date, 100.0)
        } else {
            IndicatorPoint::simple(bar.date, 100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
        };
        values.push(point);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                asset: "TEST".into(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            })
            .collect()
    }

    #[test]
    fn rsi_empty_bars() {
        let series = calculate_rsi(&[], 14);
        assert!(series.values.is_empty());
    }

    #[test]
    fn rsi_warmup_period() {
        let prices: Vec<f64> = (1..=16).map(|i| 100.0 + (i % 5) as f64 * 2.0).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);

        assert_eq!(series.values.len(), 16);
        for i in 0..14 {
            assert!(!series.values[i].valid, "Bar {} should be invalid", i);
        }
        assert!(series.values[14].valid);
        assert!(series.values[15].valid);
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);
        assert_eq!(series.simple_at(14), Some(100.0));
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);
        let rsi = series.simple_at(14).unwrap();
        assert!(rsi.abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_flat_prices_undefined() {
        let series = calculate_rsi(&make_bars(&[50.0; 20]), 14);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn rsi_uses_simple_rolling_mean() {
        // Changes over the last 3 bars: +2, -1, +1 → gain 3/3, loss 1/3.
        let series = calculate_rsi(&make_bars(&[10.0, 12.0, 11.0, 12.0]), 3);
        let expected = 100.0 - 100.0 / (1.0 + 3.0);
        assert!((series.simple_at(3).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn rsi_window_rolls_forward() {
        // Bar 4 window: -1, +1, +3 → gain 4, loss 1.
        let series = calculate_rsi(&make_bars(&[10.0, 12.0, 11.0, 12.0, 15.0]), 3);
        let expected = 100.0 - 100.0 / (1.0 + 4.0);
        assert!((series.simple_at(4).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn rsi_zero_period() {
        let series = calculate_rsi(&make_bars(&[1.0, 2.0]), 0);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    proptest! {
        #[test]
        fn rsi_bounded(prices in prop::collection::vec(1.0f64..1000.0, 15..60)) {
            let series = calculate_rsi(&make_bars(&prices), 14);
            for i in 0..series.values.len() {
                if let Some(rsi) = series.simple_at(i) {
                    prop_assert!((0.0..=100.0).contains(&rsi));
                }
            }
        }
    }
}
