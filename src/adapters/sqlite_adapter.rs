//! SQLite row store.

use crate::domain::enriched::{parse_open_time, EnrichedRow};
use crate::domain::error::IngestError;
use crate::domain::settings::StoreSettings;
use crate::ports::store_port::RowStore;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

const SELECT_COLUMNS: &str = "Symbol, Open_Time, Open, High, Low, Close, Volume, RSI, SMA20, \
     EMA20, MACD, Bollinger_Upper, Bollinger_Lower, ATR, ADX, Stochastic_K, Stochastic_D, VWAP";

impl SqliteStore {
    pub fn open(path: &str, pool_size: u32) -> Result<Self, IngestError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_timeout(CONNECT_TIMEOUT)
            .build(manager)
            .map_err(|e: r2d2::Error| IngestError::Database {
                reason: format!("{path}: {e}"),
            })?;

        Ok(Self { pool })
    }

    pub fn from_settings(settings: &StoreSettings) -> Result<Self, IngestError> {
        Self::open(&settings.sqlite_path, settings.pool_size)
    }

    pub fn in_memory() -> Result<Self, IngestError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| IngestError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, IngestError> {
        self.pool.get().map_err(|e: r2d2::Error| IngestError::Database {
            reason: e.to_string(),
        })
    }
}

fn query_error(e: rusqlite::Error) -> IngestError {
    IngestError::DatabaseQuery {
        reason: e.to_string(),
    }
}

/// A `(Symbol, Open_Time)` collision. Other constraint failures are not.
fn is_key_conflict(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn row_to_enriched(row: &rusqlite::Row<'_>) -> rusqlite::Result<EnrichedRow> {
    let time_str: String = row.get(1)?;
    let date = parse_open_time(&time_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            time_str.len(),
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })?;
    Ok(EnrichedRow {
        asset: row.get(0)?,
        date,
        open: row.get(2)?,
        high: row.get(3)?,
        low: row.get(4)?,
        close: row.get(5)?,
        volume: row.get(6)?,
        rsi: row.get(7)?,
        sma20: row.get(8)?,
        ema20: row.get(9)?,
        macd: row.get(10)?,
        bollinger_upper: row.get(11)?,
        bollinger_lower: row.get(12)?,
        atr: row.get(13)?,
        adx: row.get(14)?,
        stochastic_k: row.get(15)?,
        stochastic_d: row.get(16)?,
        vwap: row.get(17)?,
    })
}

impl RowStore for SqliteStore {
    fn ensure_schema(&self) -> Result<(), IngestError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS crypto_data (
                Symbol TEXT NOT NULL,
                Open_Time TEXT NOT NULL,
                Open REAL,
                High REAL,
                Low REAL,
                Close REAL,
                Volume REAL,
                RSI REAL,
                SMA20 REAL,
                EMA20 REAL,
                MACD REAL,
                Bollinger_Upper REAL,
                Bollinger_Lower REAL,
                ATR REAL,
                ADX REAL,
                Stochastic_K REAL,
                Stochastic_D REAL,
                VWAP REAL,
                PRIMARY KEY (Symbol, Open_Time)
            );",
        )
        .map_err(query_error)?;

        Ok(())
    }

    fn append(&self, asset: &str, rows: &[EnrichedRow]) -> Result<usize, IngestError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO crypto_data (Symbol, Open_Time, Open, High, Low, Close, Volume,
                         RSI, SMA20, EMA20, MACD, Bollinger_Upper, Bollinger_Lower,
                         ATR, ADX, Stochastic_K, Stochastic_D, VWAP)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                             ?14, ?15, ?16, ?17, ?18)",
                )
                .map_err(query_error)?;

            for row in rows {
                let result = stmt.execute(params![
                    row.asset,
                    row.open_time(),
                    row.open,
                    row.high,
                    row.low,
                    row.close,
                    row.volume,
                    row.rsi,
                    row.sma20,
                    row.ema20,
                    row.macd,
                    row.bollinger_upper,
                    row.bollinger_lower,
                    row.atr,
                    row.adx,
                    row.stochastic_k,
                    row.stochastic_d,
                    row.vwap,
                ]);

                match result {
                    Ok(_) => {}
                    // Dropping the transaction rolls back the partial batch.
                    Err(e) if is_key_conflict(&e) => {
                        return Err(IngestError::DuplicateBatch {
                            asset: asset.to_string(),
                        });
                    }
                    Err(e) => return Err(query_error(e)),
                }
            }
        }

        tx.commit().map_err(query_error)?;
        Ok(rows.len())
    }

    fn list_symbols(&self) -> Result<Vec<String>, IngestError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT Symbol FROM crypto_data ORDER BY Symbol")
            .map_err(query_error)?;

        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_error)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_error)?);
        }
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, IngestError> {
        let conn = self.conn()?;

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(Open_Time), MAX(Open_Time), COUNT(*) FROM crypto_data WHERE Symbol = ?1",
                params![symbol],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_error)?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => {
                let min = parse_open_time(&min_str).map_err(|e| IngestError::Database {
                    reason: e.to_string(),
                })?;
                let max = parse_open_time(&max_str).map_err(|e| IngestError::Database {
                    reason: e.to_string(),
                })?;
                Ok(Some((min, max, count as usize)))
            }
            _ => Ok(None),
        }
    }

    fn fetch_rows(&self, symbol: &str) -> Result<Vec<EnrichedRow>, IngestError> {
        let conn = self.conn()?;
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM crypto_data WHERE Symbol = ?1 ORDER BY Open_Time ASC"
        );
        let mut stmt = conn.prepare(&query).map_err(query_error)?;

        let rows = stmt
            .query_map(params![symbol], row_to_enriched)
            .map_err(query_error)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(query_error)?);
        }
        Ok(out)
    }
}
