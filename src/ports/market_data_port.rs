//! Market data provider port.

use crate::domain::error::IngestError;
use crate::domain::price::PricePoint;

pub trait MarketDataPort {
    /// Asset ids of the top `n` assets by market capitalization, in ranking
    /// order.
    fn list_top(&self, n: usize) -> Result<Vec<String>, IngestError>;

    /// Normalized daily history for one asset: ascending, one point per day.
    ///
    /// Any provider-level failure is reported as
    /// [`IngestError::FetchFailed`].
    fn fetch_history(&self, asset: &str) -> Result<Vec<PricePoint>, IngestError>;
}
