//! Download gateway: waits out the antivirus scan, then fetches content.
//!
//! A freshly uploaded file sits at av status `not-scanned` until the
//! transfer service's scanner gets to it. The gateway polls metadata under
//! the retry policy until a verdict lands, rejects anything that is not
//! clean, and only then downloads the bytes.

use std::sync::Arc;

use crate::services::retry::{RetryError, RetryOutcome, RetryPolicy};
use crate::services::transfer::{FileTransferClient, TransferError};
use bulkvalid_core::models::FileDetails;

pub struct FileTransferService {
    client: Arc<dyn FileTransferClient>,
    retry: RetryPolicy,
}

impl FileTransferService {
    pub fn new(client: Arc<dyn FileTransferClient>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Wait for a clean antivirus verdict, then download the file content.
    pub async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, TransferError> {
        let details = self.await_scan_verdict(file_id).await?;

        if !details.av_status.is_clean() {
            tracing::warn!(file_id, av_status = %details.av_status, "File rejected by antivirus");
            return Err(TransferError::AvRejected(format!(
                "file {} has av status {}",
                file_id, details.av_status
            )));
        }

        self.client.download(file_id).await
    }

    async fn await_scan_verdict(&self, file_id: &str) -> Result<FileDetails, TransferError> {
        self.retry
            .attempt(|| {
                let client = self.client.clone();
                let file_id = file_id.to_string();
                async move {
                    match client.details(&file_id).await? {
                        None => Err(TransferError::NotFound(file_id)),
                        Some(details) if details.av_status.is_pending() => {
                            tracing::debug!(file_id = %details.id, "File not yet scanned");
                            Ok(RetryOutcome::Retry)
                        }
                        Some(details) => Ok(RetryOutcome::Done(details)),
                    }
                }
            })
            .await
            .map_err(|e| match e {
                RetryError::Timeout(budget) => TransferError::ScanTimeout(format!(
                    "file {} still not scanned after {:?}",
                    file_id, budget
                )),
                RetryError::Operation(e) => e,
            })
    }
}
