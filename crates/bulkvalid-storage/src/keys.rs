//! Shared key generation for storage backends.
//!
//! Validated files land at `{to_location}/{file_name}`; files that fail
//! content validation are preserved under a `validator-error/` prefix inside
//! the same destination so operators can inspect them.

const VALIDATOR_ERROR_PREFIX: &str = "validator-error";

/// Key for a validated file at its destination.
pub fn destination_key(to_location: &str, file_name: &str) -> String {
    format!("{}/{}", to_location.trim_end_matches('/'), file_name)
}

/// Key for preserving a file that failed validation.
pub fn validator_error_key(to_location: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}",
        to_location.trim_end_matches('/'),
        VALIDATOR_ERROR_PREFIX,
        file_name
    )
}
