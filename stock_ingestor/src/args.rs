//! Command-line arguments for the quote ingestor.
//!
//! Every flag can also come from an `SMD_`-prefixed environment variable.
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use stock_common::settings::StoreArgs;
use stock_common::symbols::{SymbolParser, SymbolSet};
use stock_common::{Result, StockError};

use crate::provider::FINNHUB_API_URL;
use crate::worker_pool::RetryPolicy;

/// Where quote snapshots come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// Finnhub REST API; requires an API key.
    Finnhub,
    /// Local random walk, no network access.
    Simulated,
}

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Symbols to poll, separated by commas or spaces (e.g. `AAPL,EBAY`).
    #[arg(long, env = "SMD_SYMBOLS", default_value = "")]
    pub symbols: String,

    /// Text file with more symbols, separated by commas, spaces, or new lines.
    #[arg(long, env = "SMD_SYMBOLS_FILE")]
    pub symbols_file: Option<String>,

    /// Seconds between two fetches of the same symbol.
    #[arg(long, env = "SMD_FREQUENCY", default_value_t = 5)]
    pub frequency: u64,

    /// Quote source.
    #[arg(long, value_enum, env = "SMD_PROVIDER", default_value_t = ProviderKind::Finnhub)]
    pub provider: ProviderKind,

    /// Provider credential.
    #[arg(long, env = "SMD_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Provider base URL.
    #[arg(long, env = "SMD_API_URL", default_value = FINNHUB_API_URL)]
    pub api_url: String,

    /// Provider request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub request_timeout: u64,

    /// Worker threads executing fetches.
    #[arg(long, env = "SMD_WORKERS", default_value_t = 4)]
    pub workers: usize,

    /// Attempts per tick for transient failures; 1 disables retries.
    #[arg(long, env = "SMD_MAX_ATTEMPTS", default_value_t = 1)]
    pub max_attempts: u32,

    /// Pause between attempts in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub retry_delay_ms: u64,

    /// Keep quotes in memory instead of writing the database.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

impl Args {
    /// Symbols from `--symbols` merged with `--symbols-file`.
    pub fn symbol_set(&self) -> Result<SymbolSet> {
        let mut set: SymbolSet = self.symbols.parse()?;
        if let Some(raw) = &self.symbols_file {
            let path = normalize_path(raw);
            if !path.is_file() {
                return Err(StockError::Config(format!(
                    "symbols file not found: {}",
                    path.display()
                )));
            }
            let file = File::open(&path)?;
            set.extend(SymbolSet::parse_from_file(BufReader::new(file))?);
        }
        Ok(set)
    }

    /// Fetch frequency; must be positive.
    pub fn frequency(&self) -> Result<Duration> {
        if self.frequency == 0 {
            return Err(StockError::Config("--frequency must be at least 1 second".to_string()));
        }
        Ok(Duration::from_secs(self.frequency))
    }

    /// Retry policy of the dispatch layer.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}
