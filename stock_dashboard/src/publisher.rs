//! Destinations for refreshed snapshots.
//!
//! - `LogPublisher` — one summary line per symbol through `log`.
//! - `JsonFilePublisher` — the full snapshot as JSON for an external renderer,
//!   replaced atomically so readers never see a half-written file.
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use stock_common::Result;

use crate::snapshot::Snapshot;

/// Receives every successfully refreshed snapshot.
pub trait Publisher {
    /// Publish `snapshot`; an error is logged by the caller and the loop goes on.
    fn publish(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// Logs the latest price and change of every series.
#[derive(Debug, Default)]
pub struct LogPublisher;

impl Publisher for LogPublisher {
    fn publish(&mut self, snapshot: &Snapshot) -> Result<()> {
        info!(
            "Window [{}, {}]: symbols [{}], {} points",
            snapshot.window.start,
            snapshot.window.end,
            snapshot.symbols().join(", "),
            snapshot.points()
        );
        for series in &snapshot.series {
            let last = series.ts.len().saturating_sub(1);
            if let (Some(price), Some(change)) =
                (series.current_price.get(last), series.percent_change.get(last))
            {
                info!(
                    "{:<6} Price={:.2} Change={:.2}% Points={}",
                    series.symbol,
                    price,
                    change,
                    series.ts.len()
                );
            }
        }
        Ok(())
    }
}

/// Writes each snapshot to a JSON file.
#[derive(Debug)]
pub struct JsonFilePublisher {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl JsonFilePublisher {
    /// Publish to `path`; a sibling `.tmp` file is used while writing.
    pub fn new(path: &Path) -> Self {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        Self {
            path: path.to_path_buf(),
            tmp_path: PathBuf::from(tmp),
        }
    }
}

impl Publisher for JsonFilePublisher {
    fn publish(&mut self, snapshot: &Snapshot) -> Result<()> {
        let data = serde_json::to_vec_pretty(snapshot)?;
        fs::write(&self.tmp_path, data)?;
        fs::rename(&self.tmp_path, &self.path)?;
        Ok(())
    }
}

/// Fans a snapshot out to several publishers.
///
/// Every publisher is tried; the first error is returned afterwards.
#[derive(Default)]
pub struct Fanout {
    targets: Vec<Box<dyn Publisher>>,
}

impl Fanout {
    /// Add a destination.
    pub fn with(mut self, target: impl Publisher + 'static) -> Self {
        self.targets.push(Box::new(target));
        self
    }
}

impl Publisher for Fanout {
    fn publish(&mut self, snapshot: &Snapshot) -> Result<()> {
        let mut first_error = None;
        for target in &mut self.targets {
            if let Err(e) = target.publish(snapshot) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
