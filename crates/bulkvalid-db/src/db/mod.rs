//! Database repositories for data access layer
//!
//! Each repository owns one table: `file_validations` for the per-file record
//! store, `scheduler_locks` for the run lock guarding scheduled processing.

pub mod file_validation;
pub mod scheduler_lock;

pub use file_validation::{FileValidationRepository, RecordStore};
pub use scheduler_lock::SchedulerLockRepository;
