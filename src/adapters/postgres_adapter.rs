//! PostgreSQL row store.

use crate::domain::enriched::{parse_open_time, EnrichedRow};
use crate::domain::error::IngestError;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::RowStore;
use chrono::NaiveDate;
use postgres::error::SqlState;
use postgres::types::ToSql;
use postgres::{Client, NoTls, Row};
use std::cell::RefCell;

pub struct PostgresStore {
    client: RefCell<Client>,
}

impl PostgresStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, IngestError> {
        let connection_string = config
            .get_string("postgres", "connection_string")
            .or_else(|| config.get_string("database", "conninfo"))
            .ok_or_else(|| IngestError::ConfigMissing {
                section: "postgres".into(),
                key: "connection_string".into(),
            })?;

        let client =
            Client::connect(&connection_string, NoTls).map_err(|e| IngestError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client: RefCell::new(client),
        })
    }
}

fn query_error(e: postgres::Error) -> IngestError {
    IngestError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn row_to_enriched(row: &Row) -> Result<EnrichedRow, IngestError> {
    let time_str: String = row.get(1);
    let date = parse_open_time(&time_str).map_err(|e| IngestError::Database {
        reason: format!("bad Open_Time '{time_str}': {e}"),
    })?;
    Ok(EnrichedRow {
        asset: row.get(0),
        date,
        open: row.get(2),
        high: row.get(3),
        low: row.get(4),
        close: row.get(5),
        volume: row.get(6),
        rsi: row.get(7),
        sma20: row.get(8),
        ema20: row.get(9),
        macd: row.get(10),
        bollinger_upper: row.get(11),
        bollinger_lower: row.get(12),
        atr: row.get(13),
        adx: row.get(14),
        stochastic_k: row.get(15),
        stochastic_d: row.get(16),
        vwap: row.get(17),
    })
}

impl RowStore for PostgresStore {
    fn ensure_schema(&self) -> Result<(), IngestError> {
        self.client
            .borrow_mut()
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS crypto_data (
                    symbol TEXT NOT NULL,
                    open_time TEXT NOT NULL,
                    open DOUBLE PRECISION,
                    high DOUBLE PRECISION,
                    low DOUBLE PRECISION,
                    close DOUBLE PRECISION,
                    volume DOUBLE PRECISION,
                    rsi DOUBLE PRECISION,
                    sma20 DOUBLE PRECISION,
                    ema20 DOUBLE PRECISION,
                    macd DOUBLE PRECISION,
                    bollinger_upper DOUBLE PRECISION,
                    bollinger_lower DOUBLE PRECISION,
                    atr DOUBLE PRECISION,
                    adx DOUBLE PRECISION,
                    stochastic_k DOUBLE PRECISION,
                    stochastic_d DOUBLE PRECISION,
                    vwap DOUBLE PRECISION,
                    PRIMARY KEY (symbol, open_time)
                )",
            )
            .map_err(query_error)
    }

    fn append(&self, asset: &str, rows: &[EnrichedRow]) -> Result<usize, IngestError> {
        let mut client = self.client.borrow_mut();
        let mut tx = client.transaction().map_err(query_error)?;

        let stmt = tx
            .prepare(
                "INSERT INTO crypto_data (symbol, open_time, open, high, low, close, volume,
                     rsi, sma20, ema20, macd, bollinger_upper, bollinger_lower,
                     atr, adx, stochastic_k, stochastic_d, vwap)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                         $14, $15, $16, $17, $18)",
            )
            .map_err(query_error)?;

        for row in rows {
            let open_time = row.open_time();
            let params: &[&(dyn ToSql + Sync)] = &[
                &row.asset,
                &open_time,
                &row.open,
                &row.high,
                &row.low,
                &row.close,
                &row.volume,
                &row.rsi,
                &row.sma20,
                &row.ema20,
                &row.macd,
                &row.bollinger_upper,
                &row.bollinger_lower,
                &row.atr,
                &row.adx,
                &row.stochastic_k,
                &row.stochastic_d,
                &row.vwap,
            ];

            if let Err(e) = tx.execute(&stmt, params) {
                // The transaction rolls back when dropped.
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    return Err(IngestError::DuplicateBatch {
                        asset: asset.to_string(),
                    });
                }
                return Err(query_error(e));
            }
        }

        tx.commit().map_err(query_error)?;
        Ok(rows.len())
    }

    fn list_symbols(&self) -> Result<Vec<String>, IngestError> {
        let rows = self
            .client
            .borrow_mut()
            .query("SELECT DISTINCT symbol FROM crypto_data ORDER BY symbol", &[])
            .map_err(query_error)?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, IngestError> {
        let row = self
            .client
            .borrow_mut()
            .query_one(
                "SELECT MIN(open_time), MAX(open_time), COUNT(*) FROM crypto_data WHERE symbol = $1",
                &[&symbol],
            )
            .map_err(query_error)?;

        let min: Option<String> = row.get(0);
        let max: Option<String> = row.get(1);
        let count: i64 = row.get(2);

        match (min, max) {
            (Some(min), Some(max)) if count > 0 => {
                let parse = |s: &str| {
                    parse_open_time(s).map_err(|e| IngestError::Database {
                        reason: e.to_string(),
                    })
                };
                Ok(Some((parse(&min)?, parse(&max)?, count as usize)))
            }
            _ => Ok(None),
        }
    }

    fn fetch_rows(&self, symbol: &str) -> Result<Vec<EnrichedRow>, IngestError> {
        let rows = self
            .client
            .borrow_mut()
            .query(
                "SELECT symbol, open_time, open, high, low, close, volume, rsi, sma20, ema20,
                        macd, bollinger_upper, bollinger_lower, atr, adx,
                        stochastic_k, stochastic_d, vwap
                 FROM crypto_data WHERE symbol = $1 ORDER BY open_time ASC",
                &[&symbol],
            )
            .map_err(query_error)?;

        rows.iter().map(row_to_enriched).collect()
    }
}
