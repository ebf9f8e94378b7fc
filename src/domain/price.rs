//! Daily price observations and payload normalization.

use chrono::{DateTime, NaiveDate};

/// One daily close for an asset.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub asset: String,
    pub date: NaiveDate,
    pub close: f64,
}

/// Normalize provider `[timestamp_ms, price]` pairs into a daily series.
///
/// Timestamps are bucketed to their UTC calendar date. Pairs with an
/// unrepresentable timestamp or a non-finite price are discarded. The result
/// is sorted ascending and holds at most one point per date: the earliest
/// observation of that day wins.
pub fn normalize_prices(asset: &str, raw: &[(i64, f64)]) -> Vec<PricePoint> {
    let mut stamped: Vec<(i64, NaiveDate, f64)> = raw
        .iter()
        .filter(|(_, price)| price.is_finite())
        .filter_map(|&(ms, price)| {
            DateTime::from_timestamp_millis(ms).map(|dt| (ms, dt.date_naive(), price))
        })
        .collect();

    stamped.sort_by_key(|&(ms, _, _)| ms);

    let mut points: Vec<PricePoint> = Vec::with_capacity(stamped.len());
    for (_, date, close) in stamped {
        if points.last().is_some_and(|p| p.date == date) {
            continue;
        }
        points.push(PricePoint {
            asset: asset.to_string(),
            date,
            close,
        });
    }

    points
}
