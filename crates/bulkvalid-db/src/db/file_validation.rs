//! File validation repository: persistence for the file_validations table.

use anyhow::Result;
use async_trait::async_trait;
use bulkvalid_core::models::{FileStatus, FileValidationRecord, NewFileValidation};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Row type for file_validations table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct FileValidationRow {
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

impl FileValidationRow {
    pub fn into_record(self) -> FileValidationRecord {
        FileValidationRecord {
            id: self.id,
            file_id: self.file_id,
            file_name: self.file_name,
            from_location: self.from_location,
            to_location: self.to_location,
            status: self.status,
            error_message: self.error_message,
            created_at: self.created_at,
            created_by: self.created_by,
            updated_at: self.updated_at,
            updated_by: self.updated_by,
        }
    }
}

/// Persistence seam for file validation records.
///
/// The production implementation is `FileValidationRepository`; scheduler
/// tests swap in an in-memory store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record with status `Pending` and return it.
    async fn create(&self, new: NewFileValidation) -> Result<FileValidationRecord>;

    /// Fetch all records whose status is in `statuses`, oldest first.
    async fn find_by_statuses(&self, statuses: &[FileStatus]) -> Result<Vec<FileValidationRecord>>;

    /// Set the status and clear any previous error message.
    async fn update_status(&self, id: Uuid, status: FileStatus, actor: &str) -> Result<()>;

    /// Set a failure status together with its error message.
    async fn record_failure(
        &self,
        id: Uuid,
        status: FileStatus,
        message: &str,
        actor: &str,
    ) -> Result<()>;

    /// Fetch a record by id.
    async fn get(&self, id: Uuid) -> Result<Option<FileValidationRecord>>;
}

const SELECT_COLUMNS: &str = "id, file_id, file_name, from_location, to_location, status, \
     error_message, created_at, created_by, updated_at, updated_by";

/// Repository for the file_validations table.
#[derive(Clone)]
pub struct FileValidationRepository {
    pool: PgPool,
}

impl FileValidationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for FileValidationRepository {
    #[tracing::instrument(skip(self, new), fields(db.table = "file_validations", file_id = %new.file_id))]
    async fn create(&self, new: NewFileValidation) -> Result<FileValidationRecord> {
        let row: FileValidationRow = sqlx::query_as::<Postgres, FileValidationRow>(&format!(
            r#"
            INSERT INTO file_validations
                (id, file_id, file_name, from_location, to_location, status,
                 created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, now(), $7, now(), $7)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.file_id)
        .bind(&new.file_name)
        .bind(&new.from_location)
        .bind(&new.to_location)
        .bind(FileStatus::Pending)
        .bind(&new.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_record())
    }

    #[tracing::instrument(skip(self, statuses), fields(db.table = "file_validations", count = statuses.len()))]
    async fn find_by_statuses(&self, statuses: &[FileStatus]) -> Result<Vec<FileValidationRecord>> {
        let labels: Vec<String> = statuses.iter().map(|s| s.label().to_string()).collect();
        let rows: Vec<FileValidationRow> = sqlx::query_as::<Postgres, FileValidationRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM file_validations WHERE status = ANY($1) ORDER BY created_at"
        ))
        .bind(&labels)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(FileValidationRow::into_record).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_validations", db.record_id = %id, status = %status))]
    async fn update_status(&self, id: Uuid, status: FileStatus, actor: &str) -> Result<()> {
        // Clearing error_message keeps the message-iff-failure invariant when a
        // previously failed record is picked up again.
        let result = sqlx::query(
            r#"
            UPDATE file_validations
            SET status = $2, error_message = NULL, updated_at = now(), updated_by = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(actor)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("file validation record {} not found", id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, message), fields(db.table = "file_validations", db.record_id = %id, status = %status))]
    async fn record_failure(
        &self,
        id: Uuid,
        status: FileStatus,
        message: &str,
        actor: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE file_validations
            SET status = $2, error_message = $3, updated_at = now(), updated_by = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(message)
        .bind(actor)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("file validation record {} not found", id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_validations", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<FileValidationRecord>> {
        let row: Option<FileValidationRow> = sqlx::query_as::<Postgres, FileValidationRow>(
            &format!("SELECT {SELECT_COLUMNS} FROM file_validations WHERE id = $1"),
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(FileValidationRow::into_record))
    }
}
