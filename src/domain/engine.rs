//! Indicator engine: daily closes in, enriched rows out.
//!
//! Pure computation, no I/O. Required indicators (RSI, SMA20, EMA20, MACD,
//! Bollinger) gate whether a row is emitted at all. Tolerant indicators (ATR,
//! ADX, Stochastic, VWAP) are computed independently; a fault in one nulls
//! that field and nothing else.

use crate::domain::enriched::EnrichedRow;
use crate::domain::error::IndicatorFault;
use crate::domain::indicator::{
    adx, atr, bollinger, calculate_adx, calculate_atr, calculate_bollinger, calculate_ema,
    calculate_macd, calculate_rsi, calculate_sma, calculate_stochastic, calculate_vwap, macd,
    rsi, stochastic, IndicatorSeries, StochasticSeries,
};
use crate::domain::ohlcv::{derive_bars, OhlcvBar};
use crate::domain::price::PricePoint;
use tracing::{debug, warn};

pub const SMA_PERIOD: usize = 20;
pub const EMA_PERIOD: usize = 20;

pub type SeriesFn = fn(&[OhlcvBar]) -> Result<IndicatorSeries, IndicatorFault>;
pub type StochasticFn = fn(&[OhlcvBar]) -> Result<StochasticSeries, IndicatorFault>;

/// Fault-tolerant indicator implementations used by the engine.
#[derive(Clone, Copy)]
pub struct TolerantIndicators {
    pub atr: SeriesFn,
    pub adx: SeriesFn,
    pub stochastic: StochasticFn,
    pub vwap: SeriesFn,
}

impl Default for TolerantIndicators {
    fn default() -> Self {
        Self {
            atr: |bars| calculate_atr(bars, atr::DEFAULT_PERIOD),
            adx: |bars| calculate_adx(bars, adx::DEFAULT_PERIOD),
            stochastic: |bars| {
                calculate_stochastic(
                    bars,
                    stochastic::DEFAULT_K_PERIOD,
                    stochastic::DEFAULT_SMOOTH_K,
                    stochastic::DEFAULT_D_PERIOD,
                )
            },
            vwap: calculate_vwap,
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct IndicatorEngine {
    tolerant: TolerantIndicators,
}

impl IndicatorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerant(tolerant: TolerantIndicators) -> Self {
        Self { tolerant }
    }

    /// Enrich one asset's ordered daily series.
    ///
    /// The first point only supplies the open of the second. Rows whose
    /// required indicators are undefined are dropped; the survivors come back
    /// sorted by date.
    pub fn enrich(&self, asset: &str, points: &[PricePoint]) -> Vec<EnrichedRow> {
        let bars = derive_bars(points);
        if bars.is_empty() {
            return Vec::new();
        }

        let rsi = calculate_rsi(&bars, rsi::DEFAULT_PERIOD);
        let sma = calculate_sma(&bars, SMA_PERIOD);
        let ema = calculate_ema(&bars, EMA_PERIOD);
        let macd = calculate_macd(&bars, macd::DEFAULT_SLOW, macd::DEFAULT_FAST);
        let bands = calculate_bollinger(
            &bars,
            bollinger::DEFAULT_PERIOD,
            bollinger::DEFAULT_MULT_X100,
        );

        let n = bars.len();
        let atr = tolerant_column(asset, "ATR", n, (self.tolerant.atr)(&bars));
        let adx = tolerant_column(asset, "ADX", n, (self.tolerant.adx)(&bars));
        let vwap = tolerant_column(asset, "VWAP", n, (self.tolerant.vwap)(&bars));
        let (stoch_k, stoch_d) = match (self.tolerant.stochastic)(&bars) {
            Ok(StochasticSeries { k, d }) => {
                debug!(asset, indicator = %k.indicator_type, "computed");
                (column(&k, n), column(&d, n))
            }
            Err(fault) => {
                warn!(asset, indicator = "STOCHASTIC", %fault, "indicator fault, storing null");
                (vec![None; n], vec![None; n])
            }
        };

        let mut rows: Vec<EnrichedRow> = bars
            .iter()
            .enumerate()
            .filter_map(|(i, bar)| {
                let (bollinger_upper, bollinger_lower) = bands.bands_at(i)?;
                Some(EnrichedRow {
                    asset: asset.to_string(),
                    date: bar.date,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    volume: bar.volume,
                    rsi: rsi.simple_at(i)?,
                    sma20: sma.simple_at(i)?,
                    ema20: ema.simple_at(i)?,
                    macd: macd.simple_at(i)?,
                    bollinger_upper,
                    bollinger_lower,
                    atr: atr[i],
                    adx: adx[i],
                    stochastic_k: stoch_k[i],
                    stochastic_d: stoch_d[i],
                    vwap: vwap[i],
                })
            })
            .collect();

        rows.sort_by_key(|row| row.date);
        debug!(asset, bars = n, rows = rows.len(), "enriched series");
        rows
    }
}

fn column(series: &IndicatorSeries, len: usize) -> Vec<Option<f64>> {
    (0..len).map(|i| series.simple_at(i)).collect()
}

fn tolerant_column(
    asset: &str,
    indicator: &str,
    len: usize,
    result: Result<IndicatorSeries, IndicatorFault>,
) -> Vec<Option<f64>> {
    match result {
        Ok(series) => {
            debug!(asset, indicator = %series.indicator_type, "computed");
            column(&series, len)
        }
        Err(fault) => {
            warn!(asset, indicator, %fault, "indicator fault, storing null");
            vec![None; len]
        }
    }
}
