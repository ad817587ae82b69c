//! Run lock trait for the validation scheduler.
//!
//! Implementations guard a named scheduled job so that only one instance
//! processes files at a time. Used by the scheduler before each run; if the
//! lock is held elsewhere the run is skipped and retried on the next tick.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A successfully acquired hold on a named lock.
#[derive(Debug, Clone)]
pub struct Lease {
    pub name: String,
    pub locked_by: String,
    pub locked_at: DateTime<Utc>,
    pub locked_until: DateTime<Utc>,
    /// Earliest instant the lock may become free again after release.
    pub min_locked_until: DateTime<Utc>,
}

/// Distributed lock for scheduled runs.
///
/// `try_acquire` never blocks: it returns `None` when another holder has the
/// lock. `max_hold` bounds how long a crashed holder can keep the lock;
/// `min_hold` keeps it held briefly after release so clock-skewed instances
/// do not double-fire.
#[async_trait]
pub trait RunLock: Send + Sync {
    async fn try_acquire(
        &self,
        name: &str,
        min_hold: Duration,
        max_hold: Duration,
    ) -> Result<Option<Lease>, anyhow::Error>;

    async fn release(&self, lease: &Lease) -> Result<(), anyhow::Error>;
}
