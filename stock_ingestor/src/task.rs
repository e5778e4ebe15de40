//! Fetch-and-persist unit of work.
//!
//! One run fetches a snapshot for one symbol, normalizes it and appends the
//! resulting quote. Runs share nothing mutable with each other; the provider and
//! store handles are injected and internally synchronized.

use std::sync::Arc;

use stock_common::normalizer::normalize;
use stock_common::store::TimeSeriesStore;
use stock_common::{Quote, Result};

use crate::provider::QuoteProvider;

/// The job a worker executes for every dispatched tick.
pub struct FetchAndPersistTask {
    provider: Arc<dyn QuoteProvider>,
    store: Arc<dyn TimeSeriesStore>,
}

impl FetchAndPersistTask {
    /// Bind the task to its provider and store.
    pub fn new(provider: Arc<dyn QuoteProvider>, store: Arc<dyn TimeSeriesStore>) -> Self {
        Self { provider, store }
    }

    /// Fetch, normalize and append one quote for `symbol`.
    ///
    /// Each step must succeed before the next starts, so a failed fetch or a
    /// rejected snapshot never leaves a row behind.
    pub fn run(&self, symbol: &str) -> Result<Quote> {
        let snapshot = self.provider.fetch(symbol)?;
        let quote = normalize(symbol, &snapshot)?;
        self.store.append(&quote)?;
        Ok(quote)
    }
}
