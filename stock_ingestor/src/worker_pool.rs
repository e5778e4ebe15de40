//! Dispatch layer: a fixed pool of worker threads executing fetch-and-persist runs.
//!
//! The scheduler pushes a [`Dispatch`] per (symbol, tick) into an unbounded
//! `crossbeam_channel`; whichever worker is free picks it up. When every worker
//! is busy the queue grows instead of blocking the scheduler's clock.
//!
//! Failures stay inside the worker: they are logged with their kind and counted,
//! never propagated. With the default [`RetryPolicy`] each dispatch is attempted
//! at most once; a larger `max_attempts` re-runs transient failures, which may
//! leave duplicate rows if an append succeeded but was reported as failed.

use std::ops::AddAssign;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, select, unbounded};
use log::{debug, error, info, warn};
use stock_common::{Result, StockError};

use crate::task::FetchAndPersistTask;

/// One scheduled unit of work.
#[derive(Debug, Clone)]
pub struct Dispatch {
    /// Symbol to fetch.
    pub symbol: String,
    /// 1-based tick number of that symbol's clock.
    pub tick: u64,
    /// When the tick fired.
    pub scheduled_at: DateTime<Utc>,
}

/// How many times a dispatch may run and how long to wait between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; `1` means no retry.
    pub max_attempts: u32,
    /// Pause before each retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::from_millis(500),
        }
    }
}

/// Outcome counters of one or more workers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    /// Dispatches that ended with a stored quote.
    pub succeeded: u64,
    /// Dispatches given up on.
    pub failed: u64,
    /// Extra attempts made after transient failures.
    pub retried: u64,
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.retried += other.retried;
    }
}

/// Running pool of worker threads.
pub struct WorkerPool {
    dispatch_tx: Sender<Dispatch>,
    // Dropping the sender disconnects every worker's receiver at once.
    shutdown_tx: Option<Sender<()>>,
    handles: Vec<JoinHandle<WorkerStats>>,
}

impl WorkerPool {
    /// Spawn `workers` threads sharing `task`.
    pub fn start(workers: usize, task: Arc<FetchAndPersistTask>, retry: RetryPolicy) -> Result<Self> {
        if workers == 0 {
            return Err(StockError::Config("at least one worker is required".to_string()));
        }
        if retry.max_attempts == 0 {
            return Err(StockError::Config("max attempts must be at least 1".to_string()));
        }

        let (dispatch_tx, dispatch_rx) = unbounded::<Dispatch>();
        let (shutdown_tx, shutdown_rx) = unbounded::<()>();

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let task = Arc::clone(&task);
            let jobs = dispatch_rx.clone();
            let shutdown = shutdown_rx.clone();
            let handle = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker_loop(id, &task, retry, jobs, shutdown))?;
            handles.push(handle);
        }
        info!("Worker pool started with {} workers ({:?})", workers, retry);

        Ok(Self {
            dispatch_tx,
            shutdown_tx: Some(shutdown_tx),
            handles,
        })
    }

    /// Sender the scheduler uses to enqueue work.
    pub fn dispatcher(&self) -> Sender<Dispatch> {
        self.dispatch_tx.clone()
    }

    /// Dispatches waiting for a free worker.
    pub fn backlog(&self) -> usize {
        self.dispatch_tx.len()
    }

    /// Stop taking new work, let in-flight runs finish and join all workers.
    pub fn shutdown(mut self) -> WorkerStats {
        drop(self.shutdown_tx.take());
        let pending = self.dispatch_tx.len();
        if pending > 0 {
            warn!("Dropping {} queued dispatches on shutdown", pending);
        }

        let mut total = WorkerStats::default();
        for handle in self.handles.drain(..) {
            match handle.join() {
                Ok(stats) => total += stats,
                Err(_) => error!("A worker thread panicked"),
            }
        }
        total
    }
}

fn worker_loop(
    id: usize,
    task: &FetchAndPersistTask,
    retry: RetryPolicy,
    jobs: Receiver<Dispatch>,
    shutdown: Receiver<()>,
) -> WorkerStats {
    let mut stats = WorkerStats::default();
    loop {
        select! {
            recv(shutdown) -> _ => break,
            recv(jobs) -> msg => match msg {
                Ok(dispatch) => execute(task, retry, &dispatch, &shutdown, &mut stats),
                Err(_) => break,
            }
        }
    }
    debug!("worker-{} stopping: {:?}", id, stats);
    stats
}

fn execute(
    task: &FetchAndPersistTask,
    retry: RetryPolicy,
    dispatch: &Dispatch,
    shutdown: &Receiver<()>,
    stats: &mut WorkerStats,
) {
    let waited = Utc::now() - dispatch.scheduled_at;
    debug!(
        "{} tick {} picked up after {} ms",
        dispatch.symbol,
        dispatch.tick,
        waited.num_milliseconds()
    );

    let mut attempt = 1;
    loop {
        match task.run(&dispatch.symbol) {
            Ok(quote) => {
                stats.succeeded += 1;
                info!(
                    "{} tick {}: price={:.2} change={:.2}% ts={}",
                    quote.symbol, dispatch.tick, quote.current_price, quote.percent_change, quote.timestamp
                );
                return;
            }
            Err(e) if attempt < retry.max_attempts && e.is_transient() => {
                warn!(
                    "{} tick {} attempt {}/{} failed ({}): {}",
                    dispatch.symbol, dispatch.tick, attempt, retry.max_attempts, e.kind(), e
                );
                match shutdown.recv_timeout(retry.delay) {
                    Err(RecvTimeoutError::Timeout) => {
                        stats.retried += 1;
                        attempt += 1;
                    }
                    _ => {
                        stats.failed += 1;
                        return;
                    }
                }
            }
            Err(e) => {
                stats.failed += 1;
                error!(
                    "{} tick {} failed ({}): {}",
                    dispatch.symbol,
                    dispatch.tick,
                    e.kind(),
                    e
                );
                return;
            }
        }
    }
}
