//! Synthetic quote source.
//!
//! Each symbol follows a small random walk around its last price. The session
//! open, high and low are tracked per symbol so the snapshot has the same shape
//! as a real provider response.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use rand::Rng;
use serde_json::json;
use stock_common::Result;
use stock_common::quote::RawSnapshot;

use crate::provider::QuoteProvider;

/// Session state of one simulated symbol.
#[derive(Debug, Clone, Copy)]
struct Session {
    open: f64,
    high: f64,
    low: f64,
    last: f64,
}

/// Random-walk provider shared by all worker threads.
pub struct SimulatedProvider {
    initial_price: f64,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SimulatedProvider {
    /// Every symbol starts its walk at `initial_price`.
    pub fn new(initial_price: f64) -> Self {
        Self {
            initial_price,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Next price: uniform change within `[-1%, +1%]`, floored at one cent.
    fn next_price(current_price: f64) -> f64 {
        let mut rng = rand::rng();
        let change: f64 = rng.random_range(-0.01..0.01);
        (current_price * (1.0 + change)).max(0.01)
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl QuoteProvider for SimulatedProvider {
    fn fetch(&self, symbol: &str) -> Result<RawSnapshot> {
        let session = {
            let mut sessions = self.sessions.lock()?;
            let initial = self.initial_price;
            let session = sessions.entry(symbol.to_string()).or_insert(Session {
                open: initial,
                high: initial,
                low: initial,
                last: initial,
            });
            let price = Self::next_price(session.last);
            session.last = price;
            session.high = session.high.max(price);
            session.low = session.low.min(price);
            *session
        };

        let percent_change = (session.last - session.open) / session.open * 100.0;
        let snapshot = json!({
            "c": session.last,
            "h": session.high,
            "l": session.low,
            "o": session.open,
            "pc": percent_change,
            "t": Utc::now().timestamp(),
        });
        // `json!` with an object literal always yields an object.
        Ok(snapshot.as_object().cloned().unwrap_or_default())
    }
}
