//! CSV validation
//!
//! Structural validation of submitted CSV files against the fixed bulk-data
//! schema, plus the per-field constraint rules.

pub mod csv;
pub mod record;

pub use csv::{validate_csv, CsvValidationError, REQUIRED_HEADERS};
pub use record::{validate_field, FieldRuleError, EXPECTED_COLUMN_COUNT};
