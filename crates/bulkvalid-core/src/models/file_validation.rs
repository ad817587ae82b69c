use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a submitted file.
///
/// `Completed` is the only terminal status. Every error status (and `Pending`)
/// is re-selectable by the scheduler, so transient failures self-heal on a
/// later run. Unclassified failures land on `Error` rather than being left at
/// `InProgress`, which the selection query does not pick up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Pending,
    InProgress,
    Completed,
    DownloadError,
    DownloadAvError,
    UploadError,
    ValidationError,
    Error,
}

impl FileStatus {
    /// Statuses the scheduler selects for (re)processing.
    pub const ACTIONABLE: [FileStatus; 6] = [
        FileStatus::Pending,
        FileStatus::DownloadError,
        FileStatus::DownloadAvError,
        FileStatus::UploadError,
        FileStatus::ValidationError,
        FileStatus::Error,
    ];

    /// Stable label persisted in the record store.
    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::InProgress => "in_progress",
            FileStatus::Completed => "completed",
            FileStatus::DownloadError => "download_error",
            FileStatus::DownloadAvError => "download_av_error",
            FileStatus::UploadError => "upload_error",
            FileStatus::ValidationError => "validation_error",
            FileStatus::Error => "error",
        }
    }

    /// True for statuses that must carry an error message.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            FileStatus::DownloadError
                | FileStatus::DownloadAvError
                | FileStatus::UploadError
                | FileStatus::ValidationError
                | FileStatus::Error
        )
    }
}

impl Display for FileStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.label())
    }
}

impl FromStr for FileStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FileStatus::Pending),
            "in_progress" => Ok(FileStatus::InProgress),
            "completed" => Ok(FileStatus::Completed),
            "download_error" => Ok(FileStatus::DownloadError),
            "download_av_error" => Ok(FileStatus::DownloadAvError),
            "upload_error" => Ok(FileStatus::UploadError),
            "validation_error" => Ok(FileStatus::ValidationError),
            "error" => Ok(FileStatus::Error),
            _ => Err(anyhow::anyhow!("Invalid file status: {}", s)),
        }
    }
}

/// One durable record per submitted file.
///
/// `file_id` is the handle into the external transfer service that holds the
/// raw bytes; `from_location`/`to_location` and `file_name` are supplied by
/// the submitter at upload time and immutable afterwards. Only the scheduler
/// writes `status`, `error_message`, and the `updated_*` audit fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileValidationRecord {
    pub id: Uuid,
    pub file_id: String,
    pub file_name: String,
    pub from_location: String,
    pub to_location: String,
    pub status: FileStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl FileValidationRecord {
    /// Invariant check: an error message is present iff the status is a
    /// failure status.
    pub fn is_consistent(&self) -> bool {
        self.status.is_failure() == self.error_message.is_some()
    }
}

/// Fields supplied by the upload intake when creating a record. The store
/// assigns the id and audit timestamps; status starts at `Pending`.
#[derive(Debug, Clone)]
pub struct NewFileValidation {
    pub file_id: String,
    pub file_name: String,
    pub from_location: String,
    pub to_location: String,
    pub created_by: String,
}
