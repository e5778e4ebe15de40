//! Quote ingestor.
//!
//! This binary polls a market-data provider for a fixed set of symbols and
//! appends every sample to the quote store. Internally, it wires together three
//! building blocks:
//!
//! - `SymbolScheduler` — one clock thread per symbol, firing at every multiple
//!   of the configured frequency and enqueueing a `Dispatch` for that tick.
//! - `WorkerPool` — worker threads draining the dispatch queue through
//!   `crossbeam_channel`; a saturated pool lets the queue grow instead of
//!   stalling any clock.
//! - `FetchAndPersistTask` — provider fetch, normalization and a single-row
//!   append, failing independently per tick.
//!
//! Concurrency and shutdown:
//! - Clocks and workers each watch a shutdown channel; Ctrl+C drops its sender,
//!   which disconnects every receiver at once.
//! - Workers finish the run they are executing before exiting. There is no
//!   cancellation of in-flight fetches.
//! - Any provider, normalization or store error is logged by the worker that hit
//!   it; the schedule of every symbol, including the failing one, carries on.
#![warn(missing_docs)]
use crate::args::{Args, ProviderKind};
use crate::provider::{FinnhubClient, QuoteProvider, SimulatedProvider};
use crate::scheduler::SymbolScheduler;
use crate::task::FetchAndPersistTask;
use crate::worker_pool::WorkerPool;
use clap::Parser;
use crossbeam_channel::{bounded, unbounded};
use log::{error, info, warn};
use stock_common::Result;
use stock_common::StockError;
use stock_common::store::{MemoryStore, TimeSeriesStore};
use std::sync::Arc;
use std::time::Duration;

mod args;
pub mod provider;
mod scheduler;
mod task;
mod worker_pool;

fn main() -> Result<(), StockError> {
    init_logger();
    let args = Args::parse();

    let symbols = args.symbol_set()?;
    if symbols.is_empty() {
        warn!("No symbols configured (--symbols / SMD_SYMBOLS); nothing will be fetched");
    } else {
        info!("Symbols: {:?}", symbols.iter().collect::<Vec<_>>());
    }
    let scheduler = SymbolScheduler::new(&symbols, args.frequency()?)?;

    let store: Arc<dyn TimeSeriesStore> = if args.dry_run {
        info!("Dry run: quotes are kept in memory only");
        Arc::new(MemoryStore::new())
    } else {
        args.store.open()?
    };
    let provider = build_provider(&args)?;
    let task = Arc::new(FetchAndPersistTask::new(provider, store));
    let pool = WorkerPool::start(args.workers, task, args.retry_policy())?;

    let (shutdown_tx, shutdown_rx) = unbounded::<()>();
    let clocks = scheduler.start(pool.dispatcher(), &shutdown_rx)?;

    let (stop_tx, stop_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down ingestor...");
        let _ = stop_tx.try_send(());
    })
    .map_err(|e| StockError::Config(format!("cannot install Ctrl+C handler: {e}")))?;

    info!("Ingestor is running. Press Ctrl+C to exit.");
    let _ = stop_rx.recv();

    drop(shutdown_tx);
    let mut ticks = 0;
    for clock in clocks {
        match clock.join() {
            Ok(fired) => ticks += fired,
            Err(_) => error!("A scheduler clock panicked"),
        }
    }
    info!("Clocks stopped after {} ticks, {} dispatches queued", ticks, pool.backlog());

    let stats = pool.shutdown();
    info!(
        "Ingestor stopped: {} stored, {} failed, {} retried",
        stats.succeeded, stats.failed, stats.retried
    );
    Ok(())
}

fn build_provider(args: &Args) -> Result<Arc<dyn QuoteProvider>> {
    match args.provider {
        ProviderKind::Finnhub => {
            let timeout = Duration::from_secs(args.request_timeout);
            let client = FinnhubClient::new(&args.api_url, &args.api_key, timeout)?;
            info!("Fetching quotes from {}", args.api_url);
            Ok(Arc::new(client))
        }
        ProviderKind::Simulated => {
            info!("Fetching quotes from the simulated provider");
            Ok(Arc::new(SimulatedProvider::default()))
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
