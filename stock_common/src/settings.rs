//! Command-line/environment settings shared by both binaries.
//!
//! Every option can also be supplied through an `SMD_`-prefixed environment
//! variable, so a container can be configured without flags.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::Result;
use crate::store::{SqliteStore, TimeSeriesStore};

/// Default number of pooled store connections.
pub const DEFAULT_POOL_SIZE: u32 = 3;

/// Location and sizing of the quote store.
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Path to the SQLite database file holding the `quotes` table.
    #[arg(long, env = "SMD_DATABASE_PATH", default_value = "quotes.db")]
    pub database_path: PathBuf,

    /// Upper bound on concurrently open store connections.
    #[arg(long, env = "SMD_DATABASE_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub database_pool_size: u32,
}

impl StoreArgs {
    /// Open the configured store as a shareable handle.
    pub fn open(&self) -> Result<Arc<dyn TimeSeriesStore>> {
        let store = SqliteStore::open(&self.database_path, self.database_pool_size)?;
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        store: StoreArgs,
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from(["test", "--database-path", "/tmp/x.db", "--database-pool-size", "7"]);
        assert_eq!(cli.store.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(cli.store.database_pool_size, 7);
    }

    #[test]
    fn opens_store_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let args = StoreArgs {
            database_path: dir.path().join("quotes.db"),
            database_pool_size: 1,
        };
        let store = args.open().unwrap();
        assert!(store.range(0, i64::MAX, None).unwrap().is_empty());
    }
}
