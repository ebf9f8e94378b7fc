//! Fetch → enrich → append over the top-N asset universe.
//!
//! Assets are processed strictly one after another. Per-asset failures are
//! recorded and logged but never stop the run; only a failure to resolve the
//! universe itself is returned as an error.

use crate::domain::engine::IndicatorEngine;
use crate::domain::error::IngestError;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::store_port::RowStore;
use std::time::Duration;
use tracing::{error, info, warn};

/// What happened to one asset during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetOutcome {
    Stored { rows: usize },
    /// Every row key already existed; the batch was discarded.
    Duplicate,
    /// History was fetched but too short to produce any enriched row.
    NoRows,
    FetchFailed { reason: String },
    StoreFailed { reason: String },
}

#[derive(Debug, Clone)]
pub struct AssetReport {
    pub asset: String,
    pub outcome: AssetOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<AssetReport>,
}

impl RunSummary {
    pub fn attempted(&self) -> usize {
        self.reports.len()
    }

    pub fn stored(&self) -> usize {
        self.count(|o| matches!(o, AssetOutcome::Stored { .. }))
    }

    pub fn duplicates(&self) -> usize {
        self.count(|o| matches!(o, AssetOutcome::Duplicate))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                AssetOutcome::FetchFailed { .. } | AssetOutcome::StoreFailed { .. }
            )
        })
    }

    pub fn rows_written(&self) -> usize {
        self.reports
            .iter()
            .map(|r| match r.outcome {
                AssetOutcome::Stored { rows } => rows,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&AssetOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

pub struct PipelineRunner<'a> {
    market: &'a dyn MarketDataPort,
    store: &'a dyn RowStore,
    engine: IndicatorEngine,
    top_n: usize,
    pace: Duration,
    sleeper: Box<dyn Fn(Duration) + 'a>,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(
        market: &'a dyn MarketDataPort,
        store: &'a dyn RowStore,
        top_n: usize,
        pace: Duration,
    ) -> Self {
        Self {
            market,
            store,
            engine: IndicatorEngine::new(),
            top_n,
            pace,
            sleeper: Box::new(std::thread::sleep),
        }
    }

    pub fn with_engine(mut self, engine: IndicatorEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Replace the pacing sleep, e.g. to observe it in tests.
    pub fn with_sleeper(mut self, sleeper: impl Fn(Duration) + 'a) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn run(&self) -> Result<RunSummary, IngestError> {
        let assets = self.market.list_top(self.top_n)?;
        let total = assets.len();
        info!(total, "resolved asset universe");

        let mut summary = RunSummary::default();
        for (i, asset) in assets.into_iter().enumerate() {
            info!(asset = %asset, "({}/{}) fetching", i + 1, total);
            let outcome = self.process(&asset);
            summary.reports.push(AssetReport { asset, outcome });
            (self.sleeper)(self.pace);
        }

        info!(
            attempted = summary.attempted(),
            stored = summary.stored(),
            duplicates = summary.duplicates(),
            failed = summary.failed(),
            rows = summary.rows_written(),
            "run complete"
        );
        Ok(summary)
    }

    fn process(&self, asset: &str) -> AssetOutcome {
        let points = match self.market.fetch_history(asset) {
            Ok(points) => points,
            Err(e) => {
                warn!(asset, error = %e, "fetch failed, skipping");
                return AssetOutcome::FetchFailed {
                    reason: e.to_string(),
                };
            }
        };

        let rows = self.engine.enrich(asset, &points);
        if rows.is_empty() {
            warn!(asset, points = points.len(), "not enough history for any row");
            return AssetOutcome::NoRows;
        }

        match self.store.append(asset, &rows) {
            Ok(written) => {
                info!(asset, rows = written, "stored");
                AssetOutcome::Stored { rows: written }
            }
            Err(IngestError::DuplicateBatch { .. }) => {
                warn!(asset, "already present, not stored");
                AssetOutcome::Duplicate
            }
            Err(e) => {
                error!(asset, error = %e, "store failed");
                AssetOutcome::StoreFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enriched::EnrichedRow;
    use crate::domain::price::PricePoint;
    use chrono::NaiveDate;
    use std::cell::{Cell, RefCell};
    use std::collections::{HashMap, HashSet};

    struct StubMarket {
        assets: Vec<String>,
        failing: HashSet<String>,
    }

    impl MarketDataPort for StubMarket {
        fn list_top(&self, n: usize) -> Result<Vec<String>, IngestError> {
            Ok(self.assets.iter().take(n).cloned().collect())
        }

        fn fetch_history(&self, asset: &str) -> Result<Vec<PricePoint>, IngestError> {
            if self.failing.contains(asset) {
                return Err(IngestError::fetch_failed(asset, "HTTP 404 Not Found"));
            }
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            Ok((0..31)
                .map(|i| PricePoint {
                    asset: asset.to_string(),
                    date: start + chrono::Duration::days(i),
                    close: 100.0 + (i as f64 * 0.7).sin() * 4.0,
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        keys: RefCell<HashMap<(String, NaiveDate), EnrichedRow>>,
    }

    impl RowStore for MemoryStore {
        fn ensure_schema(&self) -> Result<(), IngestError> {
            Ok(())
        }

        fn append(&self, asset: &str, rows: &[EnrichedRow]) -> Result<usize, IngestError> {
            let mut keys = self.keys.borrow_mut();
            if rows
                .iter()
                .any(|r| keys.contains_key(&(r.asset.clone(), r.date)))
            {
                return Err(IngestError::DuplicateBatch {
                    asset: asset.to_string(),
                });
            }
            for r in rows {
                keys.insert((r.asset.clone(), r.date), r.clone());
            }
            Ok(rows.len())
        }

        fn list_symbols(&self) -> Result<Vec<String>, IngestError> {
            Ok(Vec::new())
        }

        fn get_data_range(
            &self,
            _symbol: &str,
        ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, IngestError> {
            Ok(None)
        }

        fn fetch_rows(&self, _symbol: &str) -> Result<Vec<EnrichedRow>, IngestError> {
            Ok(Vec::new())
        }
    }

    fn market(assets: &[&str], failing: &[&str]) -> StubMarket {
        StubMarket {
            assets: assets.iter().map(|s| s.to_string()).collect(),
            failing: failing.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn stores_every_asset() {
        let market = market(&["bitcoin", "ethereum"], &[]);
        let store = MemoryStore::default();
        let summary = PipelineRunner::new(&market, &store, 100, Duration::ZERO)
            .with_sleeper(|_| {})
            .run()
            .unwrap();

        assert_eq!(summary.attempted(), 2);
        assert_eq!(summary.stored(), 2);
        assert_eq!(summary.rows_written(), 22);
    }

    #[test]
    fn fetch_failure_does_not_stop_run() {
        let market = market(&["bitcoin", "ghost", "ethereum"], &["ghost"]);
        let store = MemoryStore::default();
        let summary = PipelineRunner::new(&market, &store, 100, Duration::ZERO)
            .with_sleeper(|_| {})
            .run()
            .unwrap();

        assert_eq!(summary.attempted(), 3);
        assert_eq!(summary.stored(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(matches!(
            summary.reports[1].outcome,
            AssetOutcome::FetchFailed { .. }
        ));
    }

    #[test]
    fn pacing_after_every_attempt() {
        let market = market(&["bitcoin", "ghost", "ethereum"], &["ghost"]);
        let store = MemoryStore::default();
        let sleeps = Cell::new(0);
        let total = Cell::new(Duration::ZERO);

        PipelineRunner::new(&market, &store, 100, Duration::from_secs(60))
            .with_sleeper(|d| {
                sleeps.set(sleeps.get() + 1);
                total.set(total.get() + d);
            })
            .run()
            .unwrap();

        assert_eq!(sleeps.get(), 3);
        assert_eq!(total.get(), Duration::from_secs(180));
    }

    #[test]
    fn second_run_is_all_duplicates() {
        let market = market(&["bitcoin", "ethereum"], &[]);
        let store = MemoryStore::default();
        let runner =
            PipelineRunner::new(&market, &store, 100, Duration::ZERO).with_sleeper(|_| {});

        runner.run().unwrap();
        let before = store.keys.borrow().len();
        let second = runner.run().unwrap();

        assert_eq!(second.duplicates(), 2);
        assert_eq!(second.rows_written(), 0);
        assert_eq!(store.keys.borrow().len(), before);
    }

    #[test]
    fn respects_top_n() {
        let market = market(&["a", "b", "c"], &[]);
        let store = MemoryStore::default();
        let summary = PipelineRunner::new(&market, &store, 2, Duration::ZERO)
            .with_sleeper(|_| {})
            .run()
            .unwrap();
        assert_eq!(summary.attempted(), 2);
    }
}
