//! Quote providers the ingestor can poll.
//!
//! - `finnhub` — HTTP client for the Finnhub `/quote` endpoint.
//! - `simulated` — random-walk generator for running without a credential.

mod finnhub;
mod simulated;

pub use finnhub::{FINNHUB_API_URL, FinnhubClient};
pub use simulated::SimulatedProvider;

use stock_common::Result;
use stock_common::quote::RawSnapshot;

/// Stateless source of point-in-time quote snapshots.
///
/// Implementations translate every transport or API failure into
/// `StockError::Provider`; interpreting the snapshot is left to the normalizer.
pub trait QuoteProvider: Send + Sync {
    /// Fetch the latest snapshot for `symbol`.
    fn fetch(&self, symbol: &str) -> Result<RawSnapshot>;
}
