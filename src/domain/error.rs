//! Domain error types.

/// Failure of a single fault-tolerant indicator computation.
///
/// A fault nulls the affected field; it never discards a row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorFault {
    #[error("insufficient history: have {bars} bars, need {minimum}")]
    InsufficientHistory { bars: usize, minimum: usize },

    #[error("division by zero at bar {index}")]
    DivisionByZero { index: usize },

    #[error("non-finite result at bar {index}")]
    NonFinite { index: usize },
}

/// Top-level error type for cryptoingest.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("fetch failed for {asset}: {reason}")]
    FetchFailed { asset: String, reason: String },

    #[error("rows for {asset} already present")]
    DuplicateBatch { asset: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IngestError {
    pub fn fetch_failed(asset: &str, reason: impl Into<String>) -> Self {
        IngestError::FetchFailed {
            asset: asset.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&IngestError> for std::process::ExitCode {
    fn from(err: &IngestError) -> Self {
        let code: u8 = match err {
            IngestError::Io(_) => 1,
            IngestError::ConfigParse { .. }
            | IngestError::ConfigMissing { .. }
            | IngestError::ConfigInvalid { .. } => 2,
            IngestError::Database { .. }
            | IngestError::DatabaseQuery { .. }
            | IngestError::DuplicateBatch { .. } => 3,
            IngestError::FetchFailed { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failed_message_names_asset() {
        let err = IngestError::fetch_failed("bitcoin", "HTTP 404 Not Found");
        assert_eq!(err.to_string(), "fetch failed for bitcoin: HTTP 404 Not Found");
    }

    #[test]
    fn duplicate_batch_message() {
        let err = IngestError::DuplicateBatch {
            asset: "ethereum".into(),
        };
        assert_eq!(err.to_string(), "rows for ethereum already present");
    }

    #[test]
    fn indicator_fault_messages() {
        let fault = IndicatorFault::InsufficientHistory {
            bars: 10,
            minimum: 15,
        };
        assert_eq!(fault.to_string(), "insufficient history: have 10 bars, need 15");
        assert_eq!(
            IndicatorFault::DivisionByZero { index: 3 }.to_string(),
            "division by zero at bar 3"
        );
    }
}
