//! Error types shared by the ingestor and the dashboard.
//!
//! `StockError` unifies every failure the pipeline can hit. The three kinds that
//! a single fetch-and-persist run may produce (`Provider`, `Normalization`,
//! `Store`) carry their own typed enums so callers can match on the exact cause
//! while logging code only needs [`StockError::kind`].
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by all crates of the workspace.
#[derive(Error, Debug)]
pub enum StockError {
    /// The quote provider could not deliver a snapshot.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered, but the snapshot shape is unusable.
    #[error("Normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    /// The time-series store failed to write or read.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Reserved for invalid query inputs. An inverted window is not one of them.
    #[error("Query range error: {0}")]
    QueryRange(String),

    /// Invalid configuration value detected at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error originating from the standard library or files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl StockError {
    /// Short label of the error family, used in log lines and retry decisions.
    pub fn kind(&self) -> &'static str {
        match self {
            StockError::Provider(_) => "provider",
            StockError::Normalization(_) => "normalization",
            StockError::Store(_) => "store",
            StockError::QueryRange(_) => "query_range",
            StockError::Config(_) => "config",
            StockError::Io(_) => "io",
            StockError::SerdeJson(_) => "json",
            StockError::ChannelSend(_) => "channel",
            StockError::MutexLock(_) => "lock",
        }
    }

    /// Whether running the same unit of work again could succeed.
    ///
    /// Network and storage hiccups are transient; a malformed snapshot will be
    /// malformed again.
    pub fn is_transient(&self) -> bool {
        match self {
            StockError::Provider(err) => !matches!(
                err,
                ProviderError::Unauthorized(_) | ProviderError::UnknownSymbol(_)
            ),
            StockError::Store(_) => true,
            _ => false,
        }
    }
}

/// Failures reported by a quote provider.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Network, DNS, TLS or timeout failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Credential missing or rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The provider throttled the request.
    #[error("rate limit exceeded")]
    RateLimited,

    /// The provider does not know the requested symbol.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Any other non-success HTTP status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The body could not be decoded into a snapshot object.
    #[error("undecodable response: {0}")]
    Decode(String),
}

/// Reasons a raw snapshot is rejected by the normalizer.
#[allow(missing_docs)]
#[derive(Error, Debug, PartialEq)]
pub enum NormalizationError {
    #[error("symbol is empty")]
    EmptySymbol,

    #[error("required field `{0}` is missing")]
    MissingField(String),

    #[error("field `{0}` is not numeric")]
    NonNumeric(String),

    #[error("field `{0}` is not finite")]
    NonFinite(String),

    #[error("timestamp is not a positive integer: {0}")]
    InvalidTimestamp(String),
}

/// Failures of the time-series store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No connection could be borrowed from the pool.
    #[error("connection pool: {0}")]
    Pool(String),

    /// The statement itself failed.
    #[error("sql: {0}")]
    Sql(String),
}

impl From<reqwest::Error> for StockError {
    fn from(err: reqwest::Error) -> Self {
        StockError::Provider(ProviderError::Transport(err.to_string()))
    }
}

impl From<rusqlite::Error> for StockError {
    fn from(err: rusqlite::Error) -> Self {
        StockError::Store(StoreError::Sql(err.to_string()))
    }
}

impl From<r2d2::Error> for StockError {
    fn from(err: r2d2::Error) -> Self {
        StockError::Store(StoreError::Pool(err.to_string()))
    }
}

impl<T> From<PoisonError<T>> for StockError {
    fn from(err: PoisonError<T>) -> Self {
        StockError::MutexLock(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_variant() {
        let err: StockError = ProviderError::RateLimited.into();
        assert_eq!(err.kind(), "provider");
        let err: StockError = NormalizationError::EmptySymbol.into();
        assert_eq!(err.kind(), "normalization");
        let err: StockError = StoreError::Sql("locked".into()).into();
        assert_eq!(err.kind(), "store");
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(StockError::from(ProviderError::RateLimited).is_transient());
        assert!(StockError::from(ProviderError::Transport("reset".into())).is_transient());
        assert!(StockError::from(StoreError::Pool("timeout".into())).is_transient());
        assert!(!StockError::from(ProviderError::UnknownSymbol("XYZ".into())).is_transient());
        assert!(!StockError::from(NormalizationError::MissingField("c".into())).is_transient());
    }

    #[test]
    fn poisoned_lock_maps_to_mutex_variant() {
        let lock = std::sync::Arc::new(std::sync::Mutex::new(0));
        let clone = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock().unwrap();
            panic!("poison");
        })
        .join();
        let err: StockError = lock.lock().unwrap_err().into();
        assert_eq!(err.kind(), "lock");
    }
}
