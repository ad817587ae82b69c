pub mod gateway;
pub mod retry;
pub mod transfer;
