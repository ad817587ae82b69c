//! Bulkvalid Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration, CSV
//! validation, and collaborator seams shared across all bulkvalid components.

pub mod config;
pub mod error;
pub mod lock;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, StorageBackend};
pub use error::PipelineError;
pub use lock::{Lease, RunLock};
pub use models::{AvStatus, FileDetails, FileStatus, FileValidationRecord, NewFileValidation};
pub use validation::{validate_csv, CsvValidationError};
