//! Mapping of raw provider snapshots into [`Quote`] records.
//!
//! This is the only place that knows the provider's response shape. It is a
//! pure function: either every required field is usable and a complete quote
//! comes out, or the snapshot is rejected as a whole.

use serde_json::Value;

use crate::error::NormalizationError;
use crate::quote::{MICROS_PER_SECOND, Quote, RawSnapshot, SnapshotField};

/// Normalize `snapshot` fetched for `symbol` into a [`Quote`].
pub fn normalize(symbol: &str, snapshot: &RawSnapshot) -> Result<Quote, NormalizationError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(NormalizationError::EmptySymbol);
    }

    let [current, high, low, open, change] = SnapshotField::PRICES;

    Ok(Quote {
        symbol: symbol.to_string(),
        current_price: price(snapshot, current)?,
        high_price: price(snapshot, high)?,
        low_price: price(snapshot, low)?,
        open_price: price(snapshot, open)?,
        percent_change: price(snapshot, change)?,
        timestamp: timestamp_micros(snapshot)?,
    })
}

fn field(snapshot: &RawSnapshot, key: SnapshotField) -> Result<&Value, NormalizationError> {
    match snapshot.get(key.as_ref()) {
        None | Some(Value::Null) => Err(NormalizationError::MissingField(key.to_string())),
        Some(value) => Ok(value),
    }
}

fn price(snapshot: &RawSnapshot, key: SnapshotField) -> Result<f64, NormalizationError> {
    let value = field(snapshot, key)?
        .as_f64()
        .ok_or_else(|| NormalizationError::NonNumeric(key.to_string()))?;
    if !value.is_finite() {
        return Err(NormalizationError::NonFinite(key.to_string()));
    }
    Ok(value)
}

fn timestamp_micros(snapshot: &RawSnapshot) -> Result<i64, NormalizationError> {
    let value = field(snapshot, SnapshotField::Timestamp)?;
    let invalid = || NormalizationError::InvalidTimestamp(value.to_string());

    let seconds = match value.as_i64() {
        Some(seconds) => seconds,
        None => {
            // Some payloads encode whole seconds as `1700000000.0`.
            let float = value.as_f64().ok_or_else(invalid)?;
            if float.fract() != 0.0 || float > i64::MAX as f64 {
                return Err(invalid());
            }
            float as i64
        }
    };

    if seconds <= 0 {
        return Err(invalid());
    }
    seconds.checked_mul(MICROS_PER_SECOND).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: Value) -> RawSnapshot {
        value.as_object().cloned().unwrap()
    }

    fn aapl() -> RawSnapshot {
        snapshot(json!({"c": 150.0, "h": 151.0, "l": 149.0, "o": 150.5, "pc": -0.3, "t": 1700000000}))
    }

    #[test]
    fn maps_all_fields_and_scales_timestamp() {
        let quote = normalize("AAPL", &aapl()).unwrap();
        assert_eq!(
            quote,
            Quote {
                symbol: "AAPL".into(),
                current_price: 150.0,
                high_price: 151.0,
                low_price: 149.0,
                open_price: 150.5,
                percent_change: -0.3,
                timestamp: 1_700_000_000_000_000,
            }
        );
    }

    #[test]
    fn missing_current_price_is_rejected() {
        let mut raw = aapl();
        raw.remove("c");
        assert_eq!(
            normalize("AAPL", &raw),
            Err(NormalizationError::MissingField("c".into()))
        );
    }

    #[test]
    fn null_counts_as_missing() {
        let mut raw = aapl();
        raw.insert("h".into(), Value::Null);
        assert_eq!(
            normalize("AAPL", &raw),
            Err(NormalizationError::MissingField("h".into()))
        );
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let mut raw = aapl();
        raw.insert("o".into(), json!("150.5"));
        assert_eq!(
            normalize("AAPL", &raw),
            Err(NormalizationError::NonNumeric("o".into()))
        );
    }

    #[test]
    fn zero_price_is_accepted() {
        let mut raw = aapl();
        raw.insert("c".into(), json!(0));
        assert_eq!(normalize("AAPL", &raw).unwrap().current_price, 0.0);
    }

    #[test]
    fn timestamp_must_be_a_positive_integer() {
        for bad in [json!(0), json!(-5), json!(1.5), json!("1700000000"), json!(true)] {
            let mut raw = aapl();
            raw.insert("t".into(), bad.clone());
            assert!(
                matches!(normalize("AAPL", &raw), Err(NormalizationError::InvalidTimestamp(_))),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn whole_float_timestamp_is_accepted() {
        let mut raw = aapl();
        raw.insert("t".into(), json!(1700000000.0));
        assert_eq!(normalize("AAPL", &raw).unwrap().timestamp, 1_700_000_000_000_000);
    }

    #[test]
    fn overflowing_timestamp_is_rejected() {
        let mut raw = aapl();
        raw.insert("t".into(), json!(i64::MAX));
        assert!(matches!(
            normalize("AAPL", &raw),
            Err(NormalizationError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn blank_symbol_is_rejected() {
        assert_eq!(normalize("  ", &aapl()), Err(NormalizationError::EmptySymbol));
    }
}
