//! Append-only, timestamp-indexed quote storage.
//!
//! The pipeline only ever appends rows and reads ranges of them back; there is
//! no update or delete path. `(symbol, timestamp)` is a non-unique key: the
//! store keeps duplicates exactly as they were written.
//!
//! - `sqlite` — pooled on-disk store used in production.
//! - `memory` — mutex-guarded vector with the same semantics, for tests and dry runs.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::Result;
use crate::quote::Quote;

/// Logical read/write contract of the time-series store.
///
/// Implementations are shared across worker threads and the query service, so
/// they must be `Send + Sync` and internally synchronized.
pub trait TimeSeriesStore: Send + Sync {
    /// Append one row. A single-row insert; nothing spans several quotes.
    fn append(&self, quote: &Quote) -> Result<()>;

    /// All rows with `start <= timestamp <= end`, optionally restricted to one
    /// symbol, ordered by ascending timestamp with ties in insertion order.
    fn range(&self, start: i64, end: i64, symbol: Option<&str>) -> Result<Vec<Quote>>;
}
