//! Bulkvalid Database Library
//!
//! Repository implementations over PostgreSQL for the file validation record
//! store and the scheduler run lock.

pub mod db;

pub use db::{FileValidationRepository, RecordStore, SchedulerLockRepository};
