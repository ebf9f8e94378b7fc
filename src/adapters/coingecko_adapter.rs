//! CoinGecko market data adapter.
//!
//! Ranking: `GET /coins/markets?vs_currency=..&order=market_cap_desc&per_page=N&page=1`
//! History: `GET /coins/{id}/market_chart?vs_currency=..&days=30&interval=daily`
//!
//! Blocking client, one request at a time, no retries. A failed history
//! request is reported per asset and the caller moves on.

use crate::domain::error::IngestError;
use crate::domain::price::{normalize_prices, PricePoint};
use crate::domain::settings::ProviderSettings;
use crate::ports::market_data_port::MarketDataPort;
use serde::Deserialize;

/// Entry of the `/coins/markets` response. Only `id` is used.
#[derive(Debug, Deserialize)]
struct MarketEntry {
    id: String,
}

/// `/coins/{id}/market_chart` response.
#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<(f64, Option<f64>)>,
}

pub struct CoinGeckoAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    vs_currency: String,
    days: u32,
}

impl CoinGeckoAdapter {
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, IngestError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("cryptoingest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IngestError::ConfigInvalid {
                section: "provider".into(),
                key: "timeout_secs".into(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            vs_currency: settings.vs_currency.clone(),
            days: settings.days,
        })
    }

    fn markets_url(&self) -> String {
        format!("{}/coins/markets", self.base_url)
    }

    fn chart_url(&self, asset: &str) -> String {
        format!("{}/coins/{}/market_chart", self.base_url, asset)
    }

    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, String> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }
        resp.text().map_err(|e| format!("failed to read body: {e}"))
    }
}

/// Parse a `/coins/markets` body into asset ids, in ranking order.
pub fn parse_markets(body: &str) -> Result<Vec<String>, serde_json::Error> {
    let entries: Vec<MarketEntry> = serde_json::from_str(body)?;
    Ok(entries.into_iter().map(|e| e.id).collect())
}

/// Parse a `/market_chart` body and normalize its `prices` series.
pub fn parse_market_chart(asset: &str, body: &str) -> Result<Vec<PricePoint>, serde_json::Error> {
    let chart: MarketChart = serde_json::from_str(body)?;
    let raw: Vec<(i64, f64)> = chart
        .prices
        .into_iter()
        .filter_map(|(ms, price)| price.map(|p| (ms as i64, p)))
        .collect();
    Ok(normalize_prices(asset, &raw))
}

impl MarketDataPort for CoinGeckoAdapter {
    fn list_top(&self, n: usize) -> Result<Vec<String>, IngestError> {
        let query = [
            ("vs_currency", self.vs_currency.clone()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", n.to_string()),
            ("page", "1".to_string()),
        ];
        let body = self
            .get(&self.markets_url(), &query)
            .map_err(|reason| IngestError::fetch_failed("coins/markets", reason))?;

        let mut ids = parse_markets(&body).map_err(|e| {
            IngestError::fetch_failed("coins/markets", format!("malformed response: {e}"))
        })?;
        ids.truncate(n);
        Ok(ids)
    }

    fn fetch_history(&self, asset: &str) -> Result<Vec<PricePoint>, IngestError> {
        let query = [
            ("vs_currency", self.vs_currency.clone()),
            ("days", self.days.to_string()),
            ("interval", "daily".to_string()),
        ];
        let body = self
            .get(&self.chart_url(asset), &query)
            .map_err(|reason| IngestError::fetch_failed(asset, reason))?;

        parse_market_chart(asset, &body)
            .map_err(|e| IngestError::fetch_failed(asset, format!("malformed response: {e}")))
    }
}
