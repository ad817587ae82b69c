//! Per-field constraint rules for one data row.
//!
//! Fields are validated in column order; the caller stops at the first
//! failing field. Lengths are measured in characters, not bytes.

use thiserror::Error;

pub const EXPECTED_COLUMN_COUNT: usize = 13;

pub const MAX_UNIQUE_ID_LENGTH: usize = 256;
pub const MAX_COMPANY_NAME_LENGTH: usize = 160;
pub const MAX_COMPANY_NUMBER_LENGTH: usize = 10;
pub const MAX_TRADING_NAME_LENGTH: usize = 160;
pub const MAX_FIRST_NAME_LENGTH: usize = 50;
pub const MAX_LAST_NAME_LENGTH: usize = 160;
pub const MAX_PROPERTY_NAME_OR_NO_LENGTH: usize = 200;
pub const MAX_ADDRESS_LINE_1_LENGTH: usize = 50;
pub const MAX_ADDRESS_LINE_2_LENGTH: usize = 50;
pub const MAX_CITY_OR_TOWN_LENGTH: usize = 50;
pub const MAX_POSTCODE_LENGTH: usize = 20;
pub const MAX_COUNTRY_LENGTH: usize = 50;

/// A single field failed its constraint. The message names the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FieldRuleError(pub String);

type FieldResult = Result<(), FieldRuleError>;

fn check_max_length(field: &str, value: &str, max: usize) -> FieldResult {
    if value.chars().count() > max {
        return Err(FieldRuleError(format!(
            "{} is over {} characters long",
            field, max
        )));
    }
    Ok(())
}

pub fn validate_unique_id(value: &str) -> FieldResult {
    if value.is_empty() || value.chars().count() > MAX_UNIQUE_ID_LENGTH {
        return Err(FieldRuleError("Unique ID is not valid".to_string()));
    }
    Ok(())
}

pub fn validate_registered_company_name(value: &str) -> FieldResult {
    check_max_length("Registered Company Name", value, MAX_COMPANY_NAME_LENGTH)
}

pub fn validate_company_number(value: &str) -> FieldResult {
    check_max_length("Company Number", value, MAX_COMPANY_NUMBER_LENGTH)
}

pub fn validate_trading_name(value: &str) -> FieldResult {
    check_max_length("Trading Name", value, MAX_TRADING_NAME_LENGTH)
}

pub fn validate_first_name(value: &str) -> FieldResult {
    check_max_length("First Name", value, MAX_FIRST_NAME_LENGTH)
}

pub fn validate_last_name(value: &str) -> FieldResult {
    check_max_length("Last Name", value, MAX_LAST_NAME_LENGTH)
}

/// Date of birth must be exactly `ddMMyyyy`: eight digits forming a real
/// calendar date with a two-digit day, two-digit month, and four-digit year.
pub fn validate_date_of_birth(value: &str) -> FieldResult {
    let strict_format = value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit());
    if !strict_format || chrono::NaiveDate::parse_from_str(value, "%d%m%Y").is_err() {
        return Err(FieldRuleError(
            "Date of Birth format is incorrect".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_property_name_or_no(value: &str) -> FieldResult {
    check_max_length(
        "Property Name or Number",
        value,
        MAX_PROPERTY_NAME_OR_NO_LENGTH,
    )
}

pub fn validate_address_line_1(value: &str) -> FieldResult {
    check_max_length("Address Line 1", value, MAX_ADDRESS_LINE_1_LENGTH)
}

pub fn validate_address_line_2(value: &str) -> FieldResult {
    check_max_length("Address Line 2", value, MAX_ADDRESS_LINE_2_LENGTH)
}

pub fn validate_city_or_town(value: &str) -> FieldResult {
    check_max_length("City or Town", value, MAX_CITY_OR_TOWN_LENGTH)
}

pub fn validate_postcode(value: &str) -> FieldResult {
    check_max_length("Postcode", value, MAX_POSTCODE_LENGTH)
}

pub fn validate_country(value: &str) -> FieldResult {
    check_max_length("Country", value, MAX_COUNTRY_LENGTH)
}

/// Validate the field at `index` (0-based column position) of a data row.
pub fn validate_field(index: usize, value: &str) -> FieldResult {
    match index {
        0 => validate_unique_id(value),
        1 => validate_registered_company_name(value),
        2 => validate_company_number(value),
        3 => validate_trading_name(value),
        4 => validate_first_name(value),
        5 => validate_last_name(value),
        6 => validate_date_of_birth(value),
        7 => validate_property_name_or_no(value),
        8 => validate_address_line_1(value),
        9 => validate_address_line_2(value),
        10 => validate_city_or_town(value),
        11 => validate_postcode(value),
        12 => validate_country(value),
        _ => Err(FieldRuleError(format!("unexpected column index {}", index))),
    }
}
