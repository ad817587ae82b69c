//! HTTP client for the file transfer service.
//!
//! The transfer service holds the raw uploaded bytes and the antivirus
//! verdict for each file. Two endpoints are used: `GET {base}/{id}` for
//! metadata and `GET {base}/{id}/download` for content.

use async_trait::async_trait;
use bulkvalid_core::models::FileDetails;
use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to, or reported by, the transfer service.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("file {0} not found in transfer service")]
    NotFound(String),

    #[error("antivirus rejected file: {0}")]
    AvRejected(String),

    #[error("gave up waiting for antivirus scan: {0}")]
    ScanTimeout(String),

    #[error("transfer service request failed: {0}")]
    Api(String),
}

/// Client seam for the transfer service; tests swap in a fake.
#[async_trait]
pub trait FileTransferClient: Send + Sync {
    /// Fetch file metadata. `Ok(None)` when the id is unknown.
    async fn details(&self, file_id: &str) -> Result<Option<FileDetails>, TransferError>;

    /// Download the raw file content.
    async fn download(&self, file_id: &str) -> Result<Vec<u8>, TransferError>;
}

/// Production client backed by reqwest.
#[derive(Clone)]
pub struct HttpFileTransferClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpFileTransferClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }
        request
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), suffix)
    }
}

#[async_trait]
impl FileTransferClient for HttpFileTransferClient {
    #[tracing::instrument(skip(self))]
    async fn details(&self, file_id: &str) -> Result<Option<FileDetails>, TransferError> {
        let response = self
            .get(&self.url(file_id))
            .send()
            .await
            .map_err(|e| TransferError::Api(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let details = response
            .error_for_status()
            .map_err(|e| TransferError::Api(e.to_string()))?
            .json::<FileDetails>()
            .await
            .map_err(|e| TransferError::Api(format!("invalid file details payload: {}", e)))?;

        Ok(Some(details))
    }

    #[tracing::instrument(skip(self))]
    async fn download(&self, file_id: &str) -> Result<Vec<u8>, TransferError> {
        let response = self
            .get(&self.url(&format!("{}/download", file_id)))
            .send()
            .await
            .map_err(|e| TransferError::Api(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TransferError::NotFound(file_id.to_string()));
        }

        let bytes = response
            .error_for_status()
            .map_err(|e| TransferError::Api(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| TransferError::Api(e.to_string()))?;

        tracing::info!(file_id, size_bytes = bytes.len(), "File content downloaded");

        Ok(bytes.to_vec())
    }
}
