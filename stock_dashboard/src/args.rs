//! Command-line arguments for the dashboard refresher.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use stock_common::settings::StoreArgs;
use stock_common::{Result, StockError};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Seconds between two refreshes.
    #[arg(long, env = "SMD_GRAPH_INTERVAL", default_value_t = 10)]
    pub interval: u64,

    /// Hours of history shown, counted back from now.
    #[arg(long, env = "SMD_LOOKBACK_HOURS", default_value_t = 5)]
    pub lookback_hours: u64,

    /// Only show this symbol; all symbols when omitted.
    #[arg(long)]
    pub symbol: Option<String>,

    /// Write every snapshot as JSON to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Refresh a single time and exit.
    #[arg(long)]
    pub once: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

impl Args {
    /// Refresh interval; must be positive.
    pub fn interval(&self) -> Result<Duration> {
        if self.interval == 0 {
            return Err(StockError::Config("--interval must be at least 1 second".to_string()));
        }
        Ok(Duration::from_secs(self.interval))
    }

    /// Lookback of the sliding window.
    pub fn lookback(&self) -> Duration {
        Duration::from_secs(self.lookback_hours.saturating_mul(3600))
    }

    /// Symbol filter, upper-cased; blank means none.
    pub fn symbol(&self) -> Option<String> {
        self.symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_ascii_uppercase)
    }
}
