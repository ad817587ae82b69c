//! Validation scheduler: periodic driver of the download → validate → store
//! pipeline.
//!
//! Each tick the scheduler takes the run lock, selects every actionable
//! record (pending plus all failure statuses, so previously failed files are
//! retried automatically), and processes them one at a time. A record's
//! failure is recorded against that record only; the rest of the batch still
//! runs. Only a failure of the selection query itself ends a run early.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use bulkvalid_core::lock::RunLock;
use bulkvalid_core::models::{FileStatus, FileValidationRecord};
use bulkvalid_core::{validate_csv, PipelineError};
use bulkvalid_db::RecordStore;
use bulkvalid_services::{FileTransferService, TransferError};
use bulkvalid_storage::{keys, Storage, StorageError};

/// Lock name guarding scheduled processing runs.
pub const PROCESS_FILES_LOCK: &str = "validation_scheduler_process_files";

/// Audit actor recorded on scheduler-driven status changes.
pub const SYSTEM_ACTOR: &str = "system";

#[derive(Clone)]
pub struct ValidationSchedulerConfig {
    pub poll_interval: Duration,
    pub lock_min_hold: Duration,
    pub lock_max_hold: Duration,
}

impl Default for ValidationSchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            lock_min_hold: Duration::from_secs(5),
            lock_max_hold: Duration::from_secs(300),
        }
    }
}

pub struct ValidationScheduler {
    records: Arc<dyn RecordStore>,
    transfers: Arc<FileTransferService>,
    storage: Arc<dyn Storage>,
    lock: Arc<dyn RunLock>,
    config: ValidationSchedulerConfig,
}

impl ValidationScheduler {
    pub fn new(
        records: Arc<dyn RecordStore>,
        transfers: Arc<FileTransferService>,
        storage: Arc<dyn Storage>,
        lock: Arc<dyn RunLock>,
        config: ValidationSchedulerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            records,
            transfers,
            storage,
            lock,
            config,
        })
    }

    /// Spawn the periodic loop. Returns the shutdown sender; dropping it or
    /// sending a unit stops the loop after the current tick.
    pub fn start(self: &Arc<Self>) -> mpsc::Sender<()> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let scheduler = Arc::clone(self);

        tokio::spawn(async move {
            let mut poll = interval(scheduler.config.poll_interval);

            tracing::info!(
                poll_interval_secs = scheduler.config.poll_interval.as_secs(),
                "Validation scheduler started"
            );

            loop {
                tokio::select! {
                    _ = poll.tick() => {
                        scheduler.run_once().await;
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Validation scheduler shutting down");
                        break;
                    }
                }
            }
        });

        shutdown_tx
    }

    /// One full scheduled run: lock, process the actionable batch, release.
    pub async fn run_once(&self) {
        let lease = match self
            .lock
            .try_acquire(
                PROCESS_FILES_LOCK,
                self.config.lock_min_hold,
                self.config.lock_max_hold,
            )
            .await
        {
            Ok(Some(lease)) => lease,
            Ok(None) => {
                tracing::debug!("Run lock held elsewhere, skipping this tick");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire run lock");
                return;
            }
        };

        if let Err(e) = self.process_batch().await {
            tracing::error!(error = %e, "Error selecting file validations");
        }

        if let Err(e) = self.lock.release(&lease).await {
            tracing::warn!(error = %e, "Failed to release run lock");
        }
    }

    async fn process_batch(&self) -> anyhow::Result<()> {
        let records = self
            .records
            .find_by_statuses(&FileStatus::ACTIONABLE)
            .await?;

        if records.is_empty() {
            tracing::debug!("No actionable file validations");
            return Ok(());
        }

        tracing::info!(count = records.len(), "Processing file validations");

        for record in records {
            self.process_record(&record).await;
        }

        Ok(())
    }

    async fn process_record(&self, record: &FileValidationRecord) {
        tracing::info!(
            record_id = %record.id,
            file_id = %record.file_id,
            file_name = %record.file_name,
            "Processing file validation"
        );

        if let Err(e) = self
            .records
            .update_status(record.id, FileStatus::InProgress, SYSTEM_ACTOR)
            .await
        {
            tracing::error!(record_id = %record.id, error = %e, "Failed to mark record in progress");
            return;
        }

        match self.run_pipeline(record).await {
            Ok(()) => {
                if let Err(e) = self
                    .records
                    .update_status(record.id, FileStatus::Completed, SYSTEM_ACTOR)
                    .await
                {
                    tracing::error!(record_id = %record.id, error = %e, "Failed to mark record completed");
                    return;
                }
                tracing::info!(record_id = %record.id, "File validation completed");
            }
            Err(err) => {
                let status = err.status();
                let message = format!("Failed to process file validation {}: {}", record.id, err);
                if let Err(e) = self
                    .records
                    .record_failure(record.id, status, &message, SYSTEM_ACTOR)
                    .await
                {
                    tracing::error!(record_id = %record.id, error = %e, "Failed to record failure");
                    return;
                }
                tracing::warn!(
                    record_id = %record.id,
                    status = %status,
                    error = %err,
                    "File validation failed"
                );
            }
        }
    }

    async fn run_pipeline(&self, record: &FileValidationRecord) -> Result<(), PipelineError> {
        let bytes = self
            .transfers
            .fetch(&record.file_id)
            .await
            .map_err(classify_transfer)?;

        if let Err(e) = validate_csv(&bytes) {
            // Preserve the failing file so operators can inspect it. Failure
            // to preserve is logged but does not change the outcome.
            let error_key = keys::validator_error_key(&record.to_location, &record.file_name);
            if let Err(store_err) = self.storage.put(&error_key, bytes).await {
                tracing::warn!(
                    record_id = %record.id,
                    key = %error_key,
                    error = %store_err,
                    "Failed to preserve invalid file"
                );
            }
            return Err(PipelineError::Validation(e.to_string()));
        }

        let key = keys::destination_key(&record.to_location, &record.file_name);
        self.storage
            .put(&key, bytes)
            .await
            .map_err(classify_storage)?;

        Ok(())
    }
}

fn classify_transfer(err: TransferError) -> PipelineError {
    match err {
        TransferError::AvRejected(msg) => PipelineError::AvRejected(msg),
        other => PipelineError::Download(other.to_string()),
    }
}

fn classify_storage(err: StorageError) -> PipelineError {
    PipelineError::Upload(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_failures_classify_onto_statuses() {
        let err = classify_transfer(TransferError::AvRejected("infected".into()));
        assert_eq!(err.status(), FileStatus::DownloadAvError);

        let err = classify_transfer(TransferError::NotFound("f1".into()));
        assert_eq!(err.status(), FileStatus::DownloadError);

        let err = classify_transfer(TransferError::ScanTimeout("f1".into()));
        assert_eq!(err.status(), FileStatus::DownloadError);

        let err = classify_transfer(TransferError::Api("503".into()));
        assert_eq!(err.status(), FileStatus::DownloadError);
    }

    #[test]
    fn storage_failures_classify_as_upload_errors() {
        let err = classify_storage(StorageError::UploadFailed("denied".into()));
        assert_eq!(err.status(), FileStatus::UploadError);
    }
}
