//! Bulkvalid Services Library
//!
//! Service-layer building blocks: the bounded scan-retry policy, the HTTP
//! client for the file transfer service, and the download gateway that
//! combines the two.

pub mod services;

pub use services::gateway::FileTransferService;
pub use services::retry::{RetryError, RetryOutcome, RetryPolicy};
pub use services::transfer::{FileTransferClient, HttpFileTransferClient, TransferError};
