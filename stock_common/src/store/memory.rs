use std::sync::Mutex;

use crate::Result;
use crate::quote::Quote;
use crate::store::TimeSeriesStore;

/// In-process store keeping rows in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Quote>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows appended so far.
    pub fn len(&self) -> Result<usize> {
        Ok(self.rows.lock()?.len())
    }

    /// `true` when nothing was appended yet.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl TimeSeriesStore for MemoryStore {
    fn append(&self, quote: &Quote) -> Result<()> {
        self.rows.lock()?.push(quote.clone());
        Ok(())
    }

    fn range(&self, start: i64, end: i64, symbol: Option<&str>) -> Result<Vec<Quote>> {
        let rows = self.rows.lock()?;
        let mut matching: Vec<Quote> = rows
            .iter()
            .filter(|q| q.timestamp >= start && q.timestamp <= end)
            .filter(|q| symbol.is_none_or(|s| q.symbol == s))
            .cloned()
            .collect();
        // Stable, so equal timestamps keep insertion order.
        matching.sort_by_key(|q| q.timestamp);
        Ok(matching)
    }
}
