//! Bulkvalid Storage Library
//!
//! Storage abstraction and backends for validated bulk-data files. The
//! scheduler writes validated files under `{to_location}/{file_name}` and
//! failing files under `{to_location}/validator-error/{file_name}`; key
//! generation is centralized in the `keys` module so both backends stay
//! consistent.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use bulkvalid_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{destination_key, validator_error_key};
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
