//! # Local Queue Database
//!
//! Durable store for contact-form submissions that could not be delivered
//! yet. Backed by SQLite so queued submissions survive process restarts.
//!
//! ## Architecture
//!
//! - **Records**: one row per submission in the `forms` table, keyed by an
//!   `AUTOINCREMENT` identifier that is never reused
//! - **Pending set**: the unsynced records, pushed to subscribers through a
//!   `watch` channel after every mutation
//! - **Write serialization**: every mutation takes a FIFO async mutex, so
//!   effects land in the order they were issued
//!
//! ## Key Components
//!
//! - `QueueStore`: connection management, schema and the observable pending set
//! - `schema.rs`: schema constants and migration bookkeeping
//! - `submissions.rs`: save, list, mark-synced and delete operations
//!
//! ## Usage
//!
//! ```rust,no_run
//! use offline_forms::client::local_db::QueueStore;
//! use offline_forms::shared::{Category, SubmissionFields};
//!
//! # async fn example() -> Result<(), offline_forms::client::OfflineError> {
//! let store = QueueStore::in_memory();
//! store.open().await?;
//!
//! let fields = SubmissionFields::new("Ana", "García", "ana@example.com", Category::General);
//! let id = store.save(&fields).await?;
//! assert_eq!(store.pending_count(), 1);
//!
//! store.mark_synced(id).await?;
//! assert_eq!(store.pending_count(), 0);
//! # Ok(())
//! # }
//! ```

pub mod schema;
pub mod submissions;

use crate::client::config::Config;
use crate::client::error::OfflineError;
use crate::shared::SubmissionRecord;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::sync::{watch, Mutex, OnceCell};
use tracing::{debug, info, warn};

/// Result type for local database operations
pub type Result<T> = std::result::Result<T, OfflineError>;

/// Where the queue lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite file on disk
    File(PathBuf),
    /// Private in-memory database, lost when the store is dropped
    Memory,
}

/// Durable queue of contact-form submissions
///
/// Opening is lazy and idempotent: the first operation that needs the
/// database opens it, and [`QueueStore::open`] may be called any number of
/// times.
#[derive(Debug)]
pub struct QueueStore {
    location: StoreLocation,
    pool: OnceCell<SqlitePool>,
    write_lock: Mutex<()>,
    pending: watch::Sender<Vec<SubmissionRecord>>,
}

impl QueueStore {
    /// Store backed by the SQLite file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_location(StoreLocation::File(path.into()))
    }

    /// Store backed by a private in-memory database
    pub fn in_memory() -> Self {
        Self::with_location(StoreLocation::Memory)
    }

    /// Store at the configured database path
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.database_path())
    }

    fn with_location(location: StoreLocation) -> Self {
        let (pending, _) = watch::channel(Vec::new());
        Self {
            location,
            pool: OnceCell::new(),
            write_lock: Mutex::new(()),
            pending,
        }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Open the database, creating the schema if needed. No-op when open.
    pub async fn open(&self) -> Result<()> {
        self.pool().await.map(|_| ())
    }

    /// Whether the database has been opened
    pub fn is_open(&self) -> bool {
        self.pool.initialized()
    }

    /// Close the underlying connections. Later operations fail.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            info!("queue store closed");
        }
    }

    pub(crate) async fn pool(&self) -> Result<&SqlitePool> {
        self.pool.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<SqlitePool> {
        let (options, max_connections) = match &self.location {
            StoreLocation::File(path) => {
                ensure_parent_dir(path)?;
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
                    .foreign_keys(true);
                (options, 5)
            }
            StoreLocation::Memory => {
                // one connection keeps the in-memory database alive and shared
                let options = SqliteConnectOptions::from_str("sqlite::memory:")
                    .map_err(OfflineError::unavailable)?;
                (options, 1)
            }
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!(error = %e, location = ?self.location, "failed to open queue store");
                OfflineError::unavailable(e)
            })?;

        Self::init_schema(&pool).await?;
        self.refresh_pending(&pool).await?;

        info!(location = ?self.location, "queue store opened");
        Ok(pool)
    }

    /// Create tables and indexes, then run any pending migrations
    async fn init_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::raw_sql(schema::SCHEMA_SQL)
            .execute(pool)
            .await
            .map_err(OfflineError::unavailable)?;

        let current_version: (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(pool)
                .await
                .map_err(OfflineError::unavailable)?;

        if schema::needs_migration(current_version.0) {
            for version in schema::get_pending_migrations(current_version.0) {
                sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
                    .bind(version)
                    .bind(chrono::Utc::now().to_rfc3339())
                    .execute(pool)
                    .await
                    .map_err(OfflineError::unavailable)?;
                debug!(version, "schema migration applied");
            }
        }

        Ok(())
    }

    /// Recompute the pending set from disk and notify subscribers
    pub(crate) async fn refresh_pending(&self, pool: &SqlitePool) -> Result<()> {
        let pending = Self::query_pending(pool).await?;
        self.publish_pending(pending);
        Ok(())
    }

    /// Replace the published pending set. Mutations compute `pending` inside
    /// their transaction and publish it only after the commit succeeded.
    pub(crate) fn publish_pending(&self, pending: Vec<SubmissionRecord>) {
        debug!(count = pending.len(), "pending set refreshed");
        self.pending.send_replace(pending);
    }

    /// Live view of the pending set, most recent first
    pub fn subscribe(&self) -> watch::Receiver<Vec<SubmissionRecord>> {
        self.pending.subscribe()
    }

    /// Current pending set, most recent first
    ///
    /// Rows whose stored payload no longer decodes are left out; they still
    /// show up in [`QueueStats::pending`] and can be removed with
    /// [`QueueStore::delete`].
    pub fn pending_forms(&self) -> Vec<SubmissionRecord> {
        self.pending.borrow().clone()
    }

    /// Number of decodable unsynced submissions, see [`QueueStore::pending_forms`]
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }

    /// Row counts for diagnostics
    pub async fn stats(&self) -> Result<QueueStats> {
        let pool = self.pool().await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM forms")
            .fetch_one(pool)
            .await
            .map_err(OfflineError::unavailable)?;

        let pending: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM forms WHERE synced = 0")
            .fetch_one(pool)
            .await
            .map_err(OfflineError::unavailable)?;

        Ok(QueueStats {
            total: total.0 as u64,
            pending: pending.0 as u64,
        })
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                OfflineError::unavailable(format!("{}: {}", parent.display(), e))
            })
        }
        _ => Ok(()),
    }
}

/// Queue statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    /// Rows currently stored
    pub total: u64,
    /// Rows not yet confirmed delivered, including undecodable ones
    pub pending: u64,
}
