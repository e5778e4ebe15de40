//!
//! Common types and services shared by the quote ingestor and the dashboard.
//!
//! This crate aggregates:
//! - `error` — unified error type `StockError` and its provider/normalization/store kinds.
//! - `result` — handy `Result<T, StockError>` alias.
//! - `quote` — the persisted `Quote` record and the raw provider snapshot type.
//! - `normalizer` — raw snapshot to `Quote` mapping.
//! - `symbols` — configured symbol set and parsing helpers.
//! - `store` — append-only time-series store trait and implementations.
//! - `query` — windowed read path used by the dashboard refresh loop.
//! - `settings` — CLI/env options shared by both binaries.
#![warn(missing_docs)]
pub mod error;
pub mod normalizer;
pub mod query;
pub mod quote;
pub mod result;
pub mod settings;
pub mod store;
pub mod symbols;

pub use error::StockError;
pub use quote::Quote;
pub use result::Result;
