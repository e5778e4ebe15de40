//! Pooled SQLite implementation of [`TimeSeriesStore`].
//!
//! Connections come from an `r2d2` pool whose `max_size` bounds concurrent
//! access. A `PooledConnection` goes back to the pool when dropped, so every
//! early return through `?` releases it as well.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Row, params};

use crate::Result;
use crate::error::StockError;
use crate::quote::Quote;
use crate::store::TimeSeriesStore;

/// How long a caller waits for a free pooled connection.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);
/// How long SQLite retries on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS quotes (
        stock_symbol   TEXT    NOT NULL,
        current_price  REAL    NOT NULL,
        high_price     REAL    NOT NULL,
        low_price      REAL    NOT NULL,
        open_price     REAL    NOT NULL,
        percent_change REAL    NOT NULL,
        ts             INTEGER NOT NULL,
        ingested_at    INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_quotes_ts ON quotes (ts);
    CREATE INDEX IF NOT EXISTS idx_quotes_symbol_ts ON quotes (stock_symbol, ts);
";

const INSERT: &str = "
    INSERT INTO quotes (stock_symbol, current_price, high_price, low_price,
                        open_price, percent_change, ts, ingested_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const SELECT_RANGE: &str = "
    SELECT stock_symbol, current_price, high_price, low_price, open_price, percent_change, ts
    FROM quotes
    WHERE ts BETWEEN ?1 AND ?2
    ORDER BY ts, rowid";

const SELECT_RANGE_FOR_SYMBOL: &str = "
    SELECT stock_symbol, current_price, high_price, low_price, open_price, percent_change, ts
    FROM quotes
    WHERE ts BETWEEN ?1 AND ?2 AND stock_symbol = ?3
    ORDER BY ts, rowid";

/// SQLite-backed quote store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` with at most `max_connections`
    /// pooled connections, and make sure the schema exists.
    pub fn open(path: &Path, max_connections: u32) -> Result<Self> {
        if max_connections == 0 {
            return Err(StockError::Config(
                "database pool size must be at least 1".to_string(),
            ));
        }

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
        });
        let pool = Pool::builder()
            .max_size(max_connections)
            .connection_timeout(CONNECTION_TIMEOUT)
            .build(manager)?;

        let store = Self { pool };
        store.pool.get()?.execute_batch(SCHEMA)?;
        info!(
            "Quote store opened at {} (pool size {})",
            path.display(),
            max_connections
        );
        Ok(store)
    }

    /// Upper bound on concurrently borrowed connections.
    pub fn max_connections(&self) -> u32 {
        self.pool.max_size()
    }
}

impl TimeSeriesStore for SqliteStore {
    fn append(&self, quote: &Quote) -> Result<()> {
        let conn = self.pool.get()?;
        conn.prepare_cached(INSERT)?.execute(params![
            quote.symbol,
            quote.current_price,
            quote.high_price,
            quote.low_price,
            quote.open_price,
            quote.percent_change,
            quote.timestamp,
            Utc::now().timestamp_micros(),
        ])?;
        debug!("Appended {} @ {}", quote.symbol, quote.timestamp);
        Ok(())
    }

    fn range(&self, start: i64, end: i64, symbol: Option<&str>) -> Result<Vec<Quote>> {
        let conn = self.pool.get()?;
        let mut stmt = match symbol {
            Some(_) => conn.prepare_cached(SELECT_RANGE_FOR_SYMBOL)?,
            None => conn.prepare_cached(SELECT_RANGE)?,
        };
        let rows = match symbol {
            Some(symbol) => stmt.query_map(params![start, end, symbol], quote_from_row)?,
            None => stmt.query_map(params![start, end], quote_from_row)?,
        };
        let quotes = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(quotes)
    }
}

fn quote_from_row(row: &Row<'_>) -> rusqlite::Result<Quote> {
    Ok(Quote {
        symbol: row.get(0)?,
        current_price: row.get(1)?,
        high_price: row.get(2)?,
        low_price: row.get(3)?,
        open_price: row.get(4)?,
        percent_change: row.get(5)?,
        timestamp: row.get(6)?,
    })
}
