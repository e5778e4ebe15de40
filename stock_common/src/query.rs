//! Windowed read path over the quote store.
//!
//! The dashboard polls [`WindowedQueryService::query`] with a sliding window on
//! a fixed interval. Queries are side-effect free and return the same schema
//! whether the window holds zero rows or thousands.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::quote::Quote;
use crate::store::TimeSeriesStore;

/// Closed time range `[start, end]` in microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Inclusive lower bound.
    pub start: i64,
    /// Inclusive upper bound.
    pub end: i64,
}

impl Window {
    /// Window covering `lookback` up to and including `now`.
    pub fn trailing(now: i64, lookback: Duration) -> Self {
        let lookback = i64::try_from(lookback.as_micros()).unwrap_or(i64::MAX);
        Self {
            start: now.saturating_sub(lookback),
            end: now,
        }
    }

    /// `true` when `start > end`; such a window matches nothing.
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

/// Chronological series of quotes for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSeries {
    /// Ticker symbol shared by every point.
    pub symbol: String,
    /// Quotes in ascending timestamp order.
    pub points: Vec<Quote>,
}

/// Answers range queries against an injected store handle.
#[derive(Clone)]
pub struct WindowedQueryService {
    store: Arc<dyn TimeSeriesStore>,
}

impl WindowedQueryService {
    /// Create a service reading from `store`.
    pub fn new(store: Arc<dyn TimeSeriesStore>) -> Self {
        Self { store }
    }

    /// All quotes with `start <= timestamp <= end`, optionally for one symbol.
    ///
    /// An inverted window yields an empty result, not an error. A blank symbol
    /// means no filter. Store failures are returned to the caller as-is so a
    /// read error never looks like an empty window.
    pub fn query(&self, start: i64, end: i64, symbol: Option<&str>) -> Result<Vec<Quote>> {
        if start > end {
            debug!("Inverted window [{}, {}], nothing to read", start, end);
            return Ok(Vec::new());
        }
        let symbol = symbol.map(str::trim).filter(|s| !s.is_empty());
        self.store.range(start, end, symbol)
    }

    /// [`Self::query`] over a [`Window`].
    pub fn query_window(&self, window: Window, symbol: Option<&str>) -> Result<Vec<Quote>> {
        self.query(window.start, window.end, symbol)
    }
}

/// Group quotes by symbol and order each group chronologically.
///
/// Groups come out sorted by symbol. The per-symbol sort is stable, so rows
/// sharing a timestamp keep the order the store returned them in.
pub fn group_series(quotes: Vec<Quote>) -> Vec<QuoteSeries> {
    let mut groups: BTreeMap<String, Vec<Quote>> = BTreeMap::new();
    for quote in quotes {
        groups.entry(quote.symbol.clone()).or_default().push(quote);
    }
    groups
        .into_iter()
        .map(|(symbol, mut points)| {
            points.sort_by_key(|q| q.timestamp);
            QuoteSeries { symbol, points }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StockError, StoreError};
    use crate::store::MemoryStore;
    use crate::store::test_support::quote;

    fn service_with(rows: &[Quote]) -> WindowedQueryService {
        let store = MemoryStore::new();
        for row in rows {
            store.append(row).unwrap();
        }
        WindowedQueryService::new(Arc::new(store))
    }

    fn sample() -> Vec<Quote> {
        vec![
            quote("AAPL", 100, 1.0),
            quote("EBAY", 110, 2.0),
            quote("AAPL", 120, 3.0),
            quote("EBAY", 300, 4.0),
        ]
    }

    #[test]
    fn repeated_query_returns_same_rows() {
        let service = service_with(&sample());
        let first = service.query(0, 1_000, Some("AAPL")).unwrap();
        let second = service.query(0, 1_000, Some("AAPL")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn symbol_filter_and_bounds_hold() {
        let service = service_with(&sample());
        let rows = service.query(100, 200, Some("AAPL")).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(
            rows.iter()
                .all(|q| q.symbol == "AAPL" && (100..=200).contains(&q.timestamp))
        );
    }

    #[test]
    fn no_filter_returns_every_symbol_in_range() {
        let service = service_with(&sample());
        assert_eq!(service.query(0, 200, None).unwrap().len(), 3);
        assert_eq!(service.query(0, 200, Some("  ")).unwrap().len(), 3);
    }

    #[test]
    fn inverted_window_is_empty_not_an_error() {
        let service = service_with(&sample());
        assert!(service.query(200, 100, None).unwrap().is_empty());
    }

    struct BrokenStore;

    impl TimeSeriesStore for BrokenStore {
        fn append(&self, _quote: &Quote) -> Result<()> {
            Err(StoreError::Sql("disk I/O error".into()).into())
        }

        fn range(&self, _start: i64, _end: i64, _symbol: Option<&str>) -> Result<Vec<Quote>> {
            Err(StoreError::Pool("timed out".into()).into())
        }
    }

    #[test]
    fn read_failure_surfaces_to_caller() {
        let service = WindowedQueryService::new(Arc::new(BrokenStore));
        let err = service.query(0, 10, None).unwrap_err();
        assert!(matches!(err, StockError::Store(StoreError::Pool(_))));
        // Inverted windows never reach the store.
        assert!(service.query(10, 0, None).unwrap().is_empty());
    }

    #[test]
    fn trailing_window_ends_at_now() {
        let window = Window::trailing(10_000_000, Duration::from_secs(3));
        assert_eq!(window, Window { start: 7_000_000, end: 10_000_000 });
        assert!(!window.is_inverted());
    }

    #[test]
    fn grouping_restores_chronology_per_symbol() {
        let rows = vec![
            quote("EBAY", 30, 3.0),
            quote("AAPL", 20, 2.0),
            quote("EBAY", 10, 1.0),
            quote("AAPL", 20, 2.5),
        ];
        let series = group_series(rows);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].symbol, "AAPL");
        let aapl: Vec<f64> = series[0].points.iter().map(|q| q.current_price).collect();
        assert_eq!(aapl, vec![2.0, 2.5]);
        let ebay: Vec<i64> = series[1].points.iter().map(|q| q.timestamp).collect();
        assert_eq!(ebay, vec![10, 30]);
    }

    #[test]
    fn grouping_nothing_gives_nothing() {
        assert!(group_series(Vec::new()).is_empty());
    }
}
