#![allow(dead_code)]

use chrono::NaiveDate;
use cryptoingest::domain::error::IngestError;
pub use cryptoingest::domain::price::PricePoint;
use cryptoingest::ports::market_data_port::MarketDataPort;
use std::collections::HashMap;

/// Market data served from memory, in insertion order.
pub struct MockMarketData {
    pub order: Vec<String>,
    pub series: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            series: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, asset: &str, points: Vec<PricePoint>) -> Self {
        self.order.push(asset.to_string());
        self.series.insert(asset.to_string(), points);
        self
    }

    pub fn with_error(mut self, asset: &str, reason: &str) -> Self {
        self.order.push(asset.to_string());
        self.errors.insert(asset.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn list_top(&self, n: usize) -> Result<Vec<String>, IngestError> {
        Ok(self.order.iter().take(n).cloned().collect())
    }

    fn fetch_history(&self, asset: &str) -> Result<Vec<PricePoint>, IngestError> {
        if let Some(reason) = self.errors.get(asset) {
            return Err(IngestError::fetch_failed(asset, reason.clone()));
        }
        Ok(self.series.get(asset).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_point(asset: &str, date: NaiveDate, close: f64) -> PricePoint {
    PricePoint {
        asset: asset.to_string(),
        date,
        close,
    }
}

/// `count` consecutive daily points from 2024-01-01 oscillating around `base`.
pub fn generate_points(asset: &str, count: usize, base: f64) -> Vec<PricePoint> {
    let start = date(2024, 1, 1);
    (0..count)
        .map(|i| {
            let wobble = (i as f64 * 0.9).sin() * base * 0.05;
            let drift = i as f64 * base * 0.002;
            make_point(
                asset,
                start + chrono::Duration::days(i as i64),
                base + wobble + drift,
            )
        })
        .collect()
}
