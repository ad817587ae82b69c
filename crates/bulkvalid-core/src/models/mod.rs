//! Data models for the validation pipeline.

mod file_validation;
mod transfer;

pub use file_validation::*;
pub use transfer::*;
