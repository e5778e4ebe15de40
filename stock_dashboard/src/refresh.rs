//! Fixed-interval refresh of the chart data.
//!
//! Every interval the loop queries the trailing window `[now - lookback, now]`,
//! groups the rows into per-symbol series and hands the snapshot to a
//! [`Publisher`]. A failed read publishes nothing for that tick, so consumers
//! keep the last good snapshot instead of receiving partial data.

use std::time::Duration;

use chrono::Utc;
use crossbeam_channel::{Receiver, select, tick};
use log::{debug, error, warn};
use stock_common::Result;
use stock_common::query::{Window, WindowedQueryService, group_series};

use crate::publisher::Publisher;
use crate::snapshot::{ChartSeries, Snapshot};

/// Polls the query service on a fixed interval.
pub struct RefreshLoop {
    service: WindowedQueryService,
    interval: Duration,
    lookback: Duration,
    symbol: Option<String>,
}

impl RefreshLoop {
    /// Refresh every `interval` over the last `lookback`, optionally for one symbol.
    pub fn new(
        service: WindowedQueryService,
        interval: Duration,
        lookback: Duration,
        symbol: Option<String>,
    ) -> Self {
        Self {
            service,
            interval,
            lookback,
            symbol,
        }
    }

    /// Query the window ending at `now` (microseconds) and build a snapshot.
    pub fn refresh_once(&self, now: i64) -> Result<Snapshot> {
        let window = Window::trailing(now, self.lookback);
        let quotes = self.service.query_window(window, self.symbol.as_deref())?;
        debug!(
            "Window [{}, {}] returned {} rows",
            window.start,
            window.end,
            quotes.len()
        );
        Ok(Snapshot {
            window,
            symbol: self.symbol.clone(),
            series: group_series(quotes).into_iter().map(ChartSeries::from).collect(),
        })
    }

    /// Refresh immediately, then on every interval until `shutdown` disconnects.
    ///
    /// Returns how many snapshots were published.
    pub fn run(&self, publisher: &mut dyn Publisher, shutdown: &Receiver<()>) -> u64 {
        let ticker = tick(self.interval);
        let mut published = 0;
        loop {
            if self.refresh_and_publish(publisher) {
                published += 1;
            }
            select! {
                recv(shutdown) -> _ => break,
                recv(ticker) -> _ => {}
            }
        }
        published
    }

    /// One refresh-and-publish step; `true` if a snapshot went out.
    pub fn refresh_and_publish(&self, publisher: &mut dyn Publisher) -> bool {
        let now = Utc::now().timestamp_micros();
        match self.refresh_once(now) {
            Ok(snapshot) => {
                if let Err(e) = publisher.publish(&snapshot) {
                    warn!("Publishing snapshot failed ({}): {}", e.kind(), e);
                }
                true
            }
            Err(e) => {
                error!("Refresh failed ({}): {}", e.kind(), e);
                false
            }
        }
    }
}
