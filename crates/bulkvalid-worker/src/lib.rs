//! Bulkvalid Worker Library
//!
//! The validation scheduler and the setup/telemetry plumbing for the worker
//! binary.

pub mod scheduler;
pub mod setup;
pub mod telemetry;

pub use scheduler::{
    ValidationScheduler, ValidationSchedulerConfig, PROCESS_FILES_LOCK, SYSTEM_ACTOR,
};
