//! Core domain types and logic.

pub mod engine;
pub mod enriched;
pub mod error;
pub mod indicator;
pub mod ohlcv;
pub mod pipeline;
pub mod price;
pub mod settings;
