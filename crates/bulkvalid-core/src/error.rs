//! Error types module
//!
//! Every failure of a single file's processing run is funnelled into
//! `PipelineError`, which carries the stage that failed and maps onto the
//! terminal `FileStatus` recorded against the file. The mapping is total:
//! any error a stage produces lands on exactly one failure status.

use crate::models::FileStatus;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The file could not be retrieved from the transfer service.
    #[error("download failed: {0}")]
    Download(String),

    /// The transfer service scanned the file and rejected it.
    #[error("antivirus rejected file: {0}")]
    AvRejected(String),

    /// The file content failed structural or field validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The validated file could not be written to its destination.
    #[error("upload failed: {0}")]
    Upload(String),

    /// Anything outside the classified stages.
    #[error("unexpected failure: {0}")]
    Unexpected(#[source] anyhow::Error),
}

impl PipelineError {
    /// The terminal status to record for a file that failed with this error.
    pub fn status(&self) -> FileStatus {
        match self {
            PipelineError::Download(_) => FileStatus::DownloadError,
            PipelineError::AvRejected(_) => FileStatus::DownloadAvError,
            PipelineError::Validation(_) => FileStatus::ValidationError,
            PipelineError::Upload(_) => FileStatus::UploadError,
            PipelineError::Unexpected(_) => FileStatus::Error,
        }
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Unexpected(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_maps_to_a_failure_status() {
        let cases = [
            (
                PipelineError::Download("gone".into()),
                FileStatus::DownloadError,
            ),
            (
                PipelineError::AvRejected("infected".into()),
                FileStatus::DownloadAvError,
            ),
            (
                PipelineError::Validation("bad row".into()),
                FileStatus::ValidationError,
            ),
            (
                PipelineError::Upload("denied".into()),
                FileStatus::UploadError,
            ),
            (
                PipelineError::Unexpected(anyhow::anyhow!("boom")),
                FileStatus::Error,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status(), expected);
            assert!(err.status().is_failure());
        }
    }

    #[test]
    fn messages_name_the_stage() {
        assert_eq!(
            PipelineError::Download("connection refused".into()).to_string(),
            "download failed: connection refused"
        );
        assert_eq!(
            PipelineError::AvRejected("av status infected".into()).to_string(),
            "antivirus rejected file: av status infected"
        );
    }
}
