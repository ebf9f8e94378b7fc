//! Deduplicating row store port.

use crate::domain::enriched::EnrichedRow;
use crate::domain::error::IngestError;
use chrono::NaiveDate;

pub trait RowStore {
    /// Create the `crypto_data` table if it does not exist.
    fn ensure_schema(&self) -> Result<(), IngestError>;

    /// Insert one asset's rows as a single batch.
    ///
    /// If any row collides with an existing `(Symbol, Open_Time)` key nothing
    /// is written and [`IngestError::DuplicateBatch`] is returned. On success
    /// the rows are committed before returning the number inserted.
    fn append(&self, asset: &str, rows: &[EnrichedRow]) -> Result<usize, IngestError>;

    fn list_symbols(&self) -> Result<Vec<String>, IngestError>;

    /// `(first, last, count)` of the stored dates for `symbol`.
    fn get_data_range(&self, symbol: &str)
        -> Result<Option<(NaiveDate, NaiveDate, usize)>, IngestError>;

    /// All stored rows for `symbol`, ascending by date.
    fn fetch_rows(&self, symbol: &str) -> Result<Vec<EnrichedRow>, IngestError>;
}
