//! Opening the catalog database.

use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// Schema migrations, compiled into the binary and applied on every open.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// One menu command runs at a time, but a report may read while nothing else
// holds a connection. A handful is plenty.
const MAX_CONNECTIONS: u32 = 4;
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(1500);

/// An open catalog database with an up-to-date schema.
///
/// Holds the SQLite pool; hand it to [`Repository::from`](crate::Repository)
/// to get at the records.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn open(options: SqliteConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // Runs for every connection the pool opens, not just the first.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Open the catalog stored at `path`, creating an empty one if the file
    /// does not exist yet. The parent directory must already exist.
    ///
    /// `busy_timeout` bounds how long a write waits on another process
    /// holding the database lock.
    pub async fn connect(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening catalog database");
        let options = Self::base_options(busy_timeout).filename(path).create_if_missing(true);
        Self::open(options, MAX_CONNECTIONS).await
    }

    /// Open a fresh, empty catalog that lives only in memory.
    ///
    /// Everything is gone once the pool closes. Not gated on `cfg(test)`
    /// because the catalog crate and the binary test against it too.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options(DEFAULT_BUSY_TIMEOUT).filename(":memory:");
        // Every `:memory:` connection is its own database, so there can only be one.
        Self::open(options, 1).await
    }

    /// Options common to file-backed and in-memory catalogs.
    fn base_options(busy_timeout: Duration) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            // Foreign key enforcement: books must point at real authors and
            // genres, and loans cascade away with their book or user.
            .foreign_keys(true)
            // Safe with WAL; only the last commits can be lost on power failure.
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(busy_timeout)
    }

    /// PRAGMAs that [`SqliteConnectOptions`] has no setter for.
    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA locking_mode = NORMAL;
                PRAGMA cache_size = -2048;
                PRAGMA temp_store = MEMORY;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Bring the schema up to date. Already-applied migrations are skipped.
    #[instrument("performing database migrations", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool once every connection has been handed back.
    ///
    /// Repositories created from this database stop working afterwards.
    pub async fn close(&self) {
        // Refresh planner statistics; failure here is harmless.
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}
