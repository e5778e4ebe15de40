//! Stock dashboard refresher — re-queries the quote store on a fixed interval and
//! republishes chart-ready series for the renderer.
//!
//! Each refresh reads the sliding window `[now - lookback, now]`, optionally
//! restricted to one symbol, groups the rows per symbol in chronological order,
//! and publishes the result to the log and, with `--output`, to a JSON file.
//!
//! Usage example (CLI):
//! ```bash
//! stock_dashboard --database-path ./quotes.db --interval 10 --symbol AAPL --output ./chart.json
//! ```
#![warn(missing_docs)]
mod args;
mod publisher;
mod refresh;
mod snapshot;

use crate::args::Args;
use crate::publisher::{Fanout, JsonFilePublisher, LogPublisher};
use crate::refresh::RefreshLoop;
use clap::Parser;
use crossbeam_channel::unbounded;
use log::info;
use stock_common::query::WindowedQueryService;
use stock_common::Result;
use stock_common::StockError;

fn main() -> Result<(), StockError> {
    init_logger();
    let args = Args::parse();

    let service = WindowedQueryService::new(args.store.open()?);
    let refresh = RefreshLoop::new(service, args.interval()?, args.lookback(), args.symbol());

    let mut publisher = Fanout::default().with(LogPublisher);
    if let Some(path) = &args.output {
        info!("Publishing snapshots to {}", path.display());
        publisher = publisher.with(JsonFilePublisher::new(path));
    }

    if args.once {
        refresh.refresh_and_publish(&mut publisher);
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = unbounded::<()>();
    let mut shutdown_tx = Some(shutdown_tx);
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down dashboard...");
        shutdown_tx.take();
    })
    .map_err(|e| StockError::Config(format!("cannot install Ctrl+C handler: {e}")))?;

    info!("Dashboard is refreshing. Press Ctrl+C to exit.");
    let published = refresh.run(&mut publisher, &shutdown_rx);
    info!("Dashboard stopped after {} refreshes", published);
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
