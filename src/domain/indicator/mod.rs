//! Technical indicator implementations.
//!
//! Every calculation returns one [`IndicatorPoint`] per input bar, so series
//! line up index-for-index with the bars they were computed from. Points
//! inside an indicator's warmup window are marked invalid.
//!
//! The windowed base indicators (RSI, SMA, EMA, MACD, Bollinger) are
//! infallible. ATR, ADX, Stochastic and VWAP return
//! `Result<_, IndicatorFault>` so a caller can null a single field when the
//! computation cannot be carried out.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod vwap;

use chrono::NaiveDate;
use std::fmt;

pub use adx::calculate_adx;
pub use atr::calculate_atr;
pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::{calculate_stochastic, StochasticSeries};
pub use vwap::calculate_vwap;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

impl IndicatorPoint {
    pub fn simple(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            valid: true,
            value: IndicatorValue::Simple(value),
        }
    }

    pub fn invalid(date: NaiveDate) -> Self {
        Self {
            date,
            valid: false,
            value: IndicatorValue::Simple(0.0),
        }
    }
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger { upper: f64, middle: f64, lower: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Atr(usize),
    Adx(usize),
    Vwap,
    /// EMA(slow) - EMA(fast), no signal line.
    Macd { slow: usize, fast: usize },
    Stochastic {
        k_period: usize,
        smooth_k: usize,
        d_period: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Simple value at `index`, or `None` if the point is missing, invalid or
    /// non-finite.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Simple(v),
                ..
            }) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Bollinger `(upper, lower)` at `index`, or `None` if invalid.
    pub fn bands_at(&self, index: usize) -> Option<(f64, f64)> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Bollinger { upper, lower, .. },
                ..
            }) if upper.is_finite() && lower.is_finite() => Some((*upper, *lower)),
            _ => None,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::Vwap => write!(f, "VWAP"),
            IndicatorType::Macd { slow, fast } => write!(f, "MACD({},{})", slow, fast),
            IndicatorType::Stochastic {
                k_period,
                smooth_k,
                d_period,
            } => write!(f, "STOCHASTIC({},{},{})", k_period, smooth_k, d_period),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
