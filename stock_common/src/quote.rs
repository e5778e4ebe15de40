//! Quote data model.
//!
//! A `Quote` is the only record the pipeline persists: one provider sample for
//! one symbol. Records are created once by the ingestor and never mutated.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Untyped provider response, interpreted only by [`crate::normalizer`].
pub type RawSnapshot = serde_json::Map<String, serde_json::Value>;

/// Microseconds in one second; provider timestamps arrive in seconds.
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Market quote for a single ticker symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker symbol, one of the configured symbols.
    pub symbol: String,
    /// Latest traded price. Zero when the provider has no data yet.
    pub current_price: f64,
    /// Session high.
    pub high_price: f64,
    /// Session low.
    pub low_price: f64,
    /// Session open.
    pub open_price: f64,
    /// Change against the previous close; may be negative.
    pub percent_change: f64,
    /// Provider-reported quote time in microseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Keys of the provider snapshot the normalizer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, EnumIter)]
pub enum SnapshotField {
    /// Current price.
    #[strum(serialize = "c")]
    Current,
    /// High price of the day.
    #[strum(serialize = "h")]
    High,
    /// Low price of the day.
    #[strum(serialize = "l")]
    Low,
    /// Open price of the day.
    #[strum(serialize = "o")]
    Open,
    /// Percent change.
    #[strum(serialize = "pc")]
    PercentChange,
    /// Quote time, epoch seconds.
    #[strum(serialize = "t")]
    Timestamp,
}

impl SnapshotField {
    /// The price-like fields, in `Quote` order.
    pub const PRICES: [SnapshotField; 5] = [
        SnapshotField::Current,
        SnapshotField::High,
        SnapshotField::Low,
        SnapshotField::Open,
        SnapshotField::PercentChange,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn field_keys_match_provider_names() {
        let keys: Vec<String> = SnapshotField::iter().map(|f| f.to_string()).collect();
        assert_eq!(keys, vec!["c", "h", "l", "o", "pc", "t"]);
        assert_eq!(SnapshotField::from_str("pc").unwrap(), SnapshotField::PercentChange);
    }

    #[test]
    fn quote_serializes_with_field_names() {
        let quote = Quote {
            symbol: "AAPL".into(),
            current_price: 150.0,
            high_price: 151.0,
            low_price: 149.0,
            open_price: 150.5,
            percent_change: -0.3,
            timestamp: 1_700_000_000 * MICROS_PER_SECOND,
        };
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["symbol"], "AAPL");
        assert_eq!(json["timestamp"], 1_700_000_000_000_000i64);
    }
}
