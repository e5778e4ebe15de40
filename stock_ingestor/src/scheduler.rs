//! Per-symbol tick clocks.
//!
//! Every configured symbol gets its own timer thread. All clocks share one
//! origin taken when the scheduler starts and fire at each multiple of the
//! fetch frequency after it, so they neither drift nor wait on each other.
//! A tick only enqueues a [`Dispatch`]; it never waits for the fetch itself.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use crossbeam_channel::{Receiver, Sender, at, select};
use log::{debug, info, warn};
use stock_common::symbols::SymbolSet;
use stock_common::{Result, StockError};

use crate::worker_pool::Dispatch;

/// Owns the configured symbols and their fetch cadence.
#[derive(Debug, Clone)]
pub struct SymbolScheduler {
    symbols: Vec<String>,
    frequency: Duration,
}

impl SymbolScheduler {
    /// Register every symbol of `symbols` at `frequency`.
    pub fn new(symbols: &SymbolSet, frequency: Duration) -> Result<Self> {
        if frequency.is_zero() {
            return Err(StockError::Config(
                "fetch frequency must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            symbols: symbols.iter().map(str::to_string).collect(),
            frequency,
        })
    }

    /// Start one clock thread per symbol.
    ///
    /// Clocks stop when `shutdown` disconnects or the dispatch queue closes.
    /// Each handle yields the number of ticks its clock fired. With no symbols
    /// nothing is spawned.
    pub fn start(
        self,
        dispatch_tx: Sender<Dispatch>,
        shutdown: &Receiver<()>,
    ) -> Result<Vec<JoinHandle<u64>>> {
        if self.symbols.is_empty() {
            info!("No symbols configured; scheduler stays idle");
            return Ok(Vec::new());
        }

        let origin = Instant::now();
        let mut handles = Vec::with_capacity(self.symbols.len());
        for symbol in self.symbols {
            let dispatch_tx = dispatch_tx.clone();
            let shutdown = shutdown.clone();
            let frequency = self.frequency;
            let handle = thread::Builder::new()
                .name(format!("tick-{symbol}"))
                .spawn(move || run_clock(symbol, origin, frequency, dispatch_tx, shutdown))?;
            handles.push(handle);
        }
        info!(
            "Scheduled {} symbols every {:?}",
            handles.len(),
            self.frequency
        );
        Ok(handles)
    }
}

fn run_clock(
    symbol: String,
    origin: Instant,
    frequency: Duration,
    dispatch_tx: Sender<Dispatch>,
    shutdown: Receiver<()>,
) -> u64 {
    let mut tick: u64 = 0;
    loop {
        let next = u32::try_from(tick + 1).unwrap_or(u32::MAX);
        let deadline = origin + frequency.saturating_mul(next);
        select! {
            recv(shutdown) -> _ => break,
            recv(at(deadline)) -> _ => {
                tick += 1;
                let dispatch = Dispatch {
                    symbol: symbol.clone(),
                    tick,
                    scheduled_at: Utc::now(),
                };
                if dispatch_tx.send(dispatch).is_err() {
                    warn!("Dispatch queue closed, stopping clock for {}", symbol);
                    break;
                }
                debug!("{} tick {} dispatched", symbol, tick);
            }
        }
    }
    tick
}
