//! Scheduler lock repository: one row per named lock in scheduler_locks.
//!
//! Acquisition is a single upsert guarded by the previous hold's expiry, so
//! exactly one instance wins even when several tick at once. A crashed holder
//! is fenced out only until `locked_until`, after which the lock is free again.

use anyhow::Result;
use async_trait::async_trait;
use bulkvalid_core::lock::{Lease, RunLock};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use std::time::Duration;

#[derive(Debug, sqlx::FromRow)]
struct SchedulerLockRow {
    name: String,
    locked_by: String,
    locked_at: DateTime<Utc>,
    locked_until: DateTime<Utc>,
}

/// Repository for the scheduler_locks table.
#[derive(Clone)]
pub struct SchedulerLockRepository {
    pool: PgPool,
    holder: String,
}

impl SchedulerLockRepository {
    pub fn new(pool: PgPool) -> Self {
        let holder = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown-host".to_string());
        Self { pool, holder }
    }
}

#[async_trait]
impl RunLock for SchedulerLockRepository {
    #[tracing::instrument(skip(self), fields(db.table = "scheduler_locks", lock.name = name, lock.holder = %self.holder))]
    async fn try_acquire(
        &self,
        name: &str,
        min_hold: Duration,
        max_hold: Duration,
    ) -> Result<Option<Lease>> {
        let now = Utc::now();
        let locked_until = now + chrono::Duration::from_std(max_hold)?;
        let min_locked_until = now + chrono::Duration::from_std(min_hold)?;

        let row: Option<SchedulerLockRow> = sqlx::query_as::<Postgres, SchedulerLockRow>(
            r#"
            INSERT INTO scheduler_locks (name, locked_by, locked_at, locked_until)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE
            SET locked_by = EXCLUDED.locked_by,
                locked_at = EXCLUDED.locked_at,
                locked_until = EXCLUDED.locked_until
            WHERE scheduler_locks.locked_until <= $3
            RETURNING name, locked_by, locked_at, locked_until
            "#,
        )
        .bind(name)
        .bind(&self.holder)
        .bind(now)
        .bind(locked_until)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Lease {
            name: r.name,
            locked_by: r.locked_by,
            locked_at: r.locked_at,
            locked_until: r.locked_until,
            min_locked_until,
        }))
    }

    #[tracing::instrument(skip(self, lease), fields(db.table = "scheduler_locks", lock.name = %lease.name))]
    async fn release(&self, lease: &Lease) -> Result<()> {
        // The hold never shrinks below min_locked_until; a fast run still
        // keeps competing instances out for the minimum period.
        sqlx::query(
            r#"
            UPDATE scheduler_locks
            SET locked_until = GREATEST($2, now())
            WHERE name = $1 AND locked_by = $3
            "#,
        )
        .bind(&lease.name)
        .bind(lease.min_locked_until)
        .bind(&lease.locked_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
