//! Chart-ready view of one refresh.
//!
//! A `Snapshot` holds one series per symbol, each in chronological order, with
//! the two values the charts plot: current price and percent change. The shape
//! is the same whether the window held no rows or many.

use serde::{Deserialize, Serialize};
use stock_common::query::{QuoteSeries, Window};

/// Columnar series for one symbol, ready to be handed to a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Ticker symbol.
    pub symbol: String,
    /// Quote timestamps, microseconds, ascending.
    pub ts: Vec<i64>,
    /// Current price at each timestamp.
    pub current_price: Vec<f64>,
    /// Percent change at each timestamp.
    pub percent_change: Vec<f64>,
}

impl From<QuoteSeries> for ChartSeries {
    fn from(series: QuoteSeries) -> Self {
        let len = series.points.len();
        let mut chart = ChartSeries {
            symbol: series.symbol,
            ts: Vec::with_capacity(len),
            current_price: Vec::with_capacity(len),
            percent_change: Vec::with_capacity(len),
        };
        for quote in series.points {
            chart.ts.push(quote.timestamp);
            chart.current_price.push(quote.current_price);
            chart.percent_change.push(quote.percent_change);
        }
        chart
    }
}

/// Result of one refresh tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Queried window.
    pub window: Window,
    /// Symbol filter in effect, if any.
    pub symbol: Option<String>,
    /// One series per symbol present in the window, sorted by symbol.
    pub series: Vec<ChartSeries>,
}

impl Snapshot {
    /// Symbols present in the window, used to fill the symbol selector.
    pub fn symbols(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.symbol.as_str()).collect()
    }

    /// Total number of points across all series.
    pub fn points(&self) -> usize {
        self.series.iter().map(|s| s.ts.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stock_common::Quote;

    fn point(ts: i64, price: f64, change: f64) -> Quote {
        Quote {
            symbol: "AAPL".into(),
            current_price: price,
            high_price: price,
            low_price: price,
            open_price: price,
            percent_change: change,
            timestamp: ts,
        }
    }

    #[test]
    fn series_becomes_columns() {
        let series = QuoteSeries {
            symbol: "AAPL".into(),
            points: vec![point(1, 10.0, -0.1), point(2, 11.0, 0.2)],
        };
        let chart = ChartSeries::from(series);
        assert_eq!(chart.ts, vec![1, 2]);
        assert_eq!(chart.current_price, vec![10.0, 11.0]);
        assert_eq!(chart.percent_change, vec![-0.1, 0.2]);
    }

    #[test]
    fn empty_snapshot_keeps_its_schema() {
        let snapshot = Snapshot {
            window: Window { start: 0, end: 10 },
            symbol: None,
            series: Vec::new(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["series"], serde_json::json!([]));
        assert_eq!(json["window"]["end"], 10);
        assert!(snapshot.symbols().is_empty());
        assert_eq!(snapshot.points(), 0);
    }
}
