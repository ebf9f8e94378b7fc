//! Persisted row: one derived bar plus its indicator values.

use chrono::{NaiveDate, NaiveTime};

/// `Open_Time` text layout in `crypto_data`.
pub const OPEN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of `crypto_data`, keyed by `(asset, date)`.
///
/// Base fields are always present. The fault-tolerant indicators are `None`
/// when their computation faulted or is still warming up.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub asset: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub rsi: f64,
    pub sma20: f64,
    pub ema20: f64,
    pub macd: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,
    pub atr: Option<f64>,
    pub adx: Option<f64>,
    pub stochastic_k: Option<f64>,
    pub stochastic_d: Option<f64>,
    pub vwap: Option<f64>,
}

impl EnrichedRow {
    /// Midnight UTC of the row's date, formatted for the `Open_Time` column.
    pub fn open_time(&self) -> String {
        format_open_time(self.date)
    }
}

pub fn format_open_time(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN).format(OPEN_TIME_FORMAT).to_string()
}

pub fn parse_open_time(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    chrono::NaiveDateTime::parse_from_str(value, OPEN_TIME_FORMAT).map(|dt| dt.date())
}
