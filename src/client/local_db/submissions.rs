//! Submission Queue Operations
//!
//! Insert, list, confirm and remove queued submissions. Every mutation holds
//! the store's write lock and runs in one transaction that also reads the new
//! pending set. The set is published only after the commit, so a failed
//! mutation changes neither the disk nor what subscribers see.

use crate::client::error::OfflineError;
use crate::client::local_db::{QueueStore, Result};
use crate::shared::{SharedError, SubmissionFields, SubmissionRecord};
use sqlx::SqliteExecutor;
use tracing::{debug, info, warn};

const SELECT_COLUMNS: &str = "SELECT id, fields, created_at, synced FROM forms";

const SELECT_PENDING: &str = "SELECT id, fields, created_at, synced FROM forms \
     WHERE synced = 0 ORDER BY created_at DESC, id DESC";

#[derive(Debug, sqlx::FromRow)]
struct FormRow {
    id: i64,
    fields: String,
    created_at: i64,
    synced: bool,
}

impl FormRow {
    fn into_record(self) -> std::result::Result<SubmissionRecord, SharedError> {
        let fields: SubmissionFields = serde_json::from_str(&self.fields)?;
        Ok(SubmissionRecord {
            id: Some(self.id),
            fields,
            created_at: self.created_at,
            synced: self.synced,
        })
    }
}

/// Decode rows, skipping any whose payload no longer parses
fn decode_rows(rows: Vec<FormRow>) -> Vec<SubmissionRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match row.into_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(id, error = %e, "skipping malformed submission row");
                    None
                }
            }
        })
        .collect()
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl QueueStore {
    pub(crate) async fn query_pending<'e, E>(executor: E) -> Result<Vec<SubmissionRecord>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows: Vec<FormRow> = sqlx::query_as(SELECT_PENDING)
            .fetch_all(executor)
            .await
            .map_err(OfflineError::unavailable)?;

        Ok(decode_rows(rows))
    }

    /// Persist a new unsynced submission and return its identifier
    pub async fn save(&self, fields: &SubmissionFields) -> Result<i64> {
        let data = serde_json::to_string(fields).map_err(OfflineError::write)?;
        let pool = self.pool().await?;
        let _guard = self.write_lock.lock().await;

        let mut tx = pool.begin().await.map_err(OfflineError::write)?;

        let result = sqlx::query("INSERT INTO forms (fields, created_at, synced) VALUES (?, ?, 0)")
            .bind(&data)
            .bind(now_millis())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to save submission locally");
                OfflineError::write(e)
            })?;
        let id = result.last_insert_rowid();

        let pending = Self::query_pending(&mut *tx).await.map_err(|e| {
            warn!(id, error = %e, "pending set unreadable; save rolled back");
            e
        })?;
        tx.commit().await.map_err(OfflineError::write)?;
        self.publish_pending(pending);

        info!(id, "submission saved locally");
        Ok(id)
    }

    /// Snapshot of unsynced submissions, most recent first
    pub async fn list_pending(&self) -> Result<Vec<SubmissionRecord>> {
        let pool = self.pool().await?;
        Self::query_pending(pool).await
    }

    /// Every stored row, oldest first
    pub async fn list_all(&self) -> Result<Vec<SubmissionRecord>> {
        let pool = self.pool().await?;
        let rows: Vec<FormRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY created_at ASC, id ASC"))
                .fetch_all(pool)
                .await
                .map_err(OfflineError::unavailable)?;

        Ok(decode_rows(rows))
    }

    /// Load a single submission
    pub async fn get(&self, id: i64) -> Result<Option<SubmissionRecord>> {
        let pool = self.pool().await?;
        let row: Option<FormRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(OfflineError::unavailable)?;

        match row {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    /// Confirm delivery of `id`: flag it synced, purge synced rows and read
    /// the new pending set in one transaction.
    pub async fn mark_synced(&self, id: i64) -> Result<()> {
        let pool = self.pool().await?;
        let _guard = self.write_lock.lock().await;

        let mut tx = pool.begin().await.map_err(OfflineError::write)?;

        let updated = sqlx::query("UPDATE forms SET synced = 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(OfflineError::write)?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(OfflineError::write)?;
            debug!(id, "mark_synced on missing submission");
            return Err(OfflineError::NotFound { id });
        }

        let purged = sqlx::query("DELETE FROM forms WHERE synced = 1")
            .execute(&mut *tx)
            .await
            .map_err(OfflineError::write)?;

        let pending = Self::query_pending(&mut *tx).await?;
        tx.commit().await.map_err(OfflineError::write)?;
        self.publish_pending(pending);

        info!(id, purged = purged.rows_affected(), "submission synced and purged");
        Ok(())
    }

    /// Remove `id`. Returns whether a row was removed; missing ids are not
    /// an error.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let pool = self.pool().await?;
        let _guard = self.write_lock.lock().await;

        let mut tx = pool.begin().await.map_err(OfflineError::write)?;

        let result = sqlx::query("DELETE FROM forms WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(OfflineError::write)?;

        let pending = Self::query_pending(&mut *tx).await?;
        tx.commit().await.map_err(OfflineError::write)?;
        self.publish_pending(pending);

        let removed = result.rows_affected() > 0;
        if removed {
            info!(id, "submission deleted");
        } else {
            debug!(id, "delete of missing submission ignored");
        }
        Ok(removed)
    }

    /// Purge every row already flagged synced
    pub async fn delete_synced(&self) -> Result<u64> {
        let pool = self.pool().await?;
        let _guard = self.write_lock.lock().await;

        let mut tx = pool.begin().await.map_err(OfflineError::write)?;

        let result = sqlx::query("DELETE FROM forms WHERE synced = 1")
            .execute(&mut *tx)
            .await
            .map_err(OfflineError::write)?;

        let pending = Self::query_pending(&mut *tx).await?;
        tx.commit().await.map_err(OfflineError::write)?;
        self.publish_pending(pending);

        Ok(result.rows_affected())
    }
}
