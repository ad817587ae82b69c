//! Structural CSV validation against the fixed bulk-data schema.
//!
//! `validate_csv` is a pure function over the raw bytes: it either returns
//! `Ok(())` for a fully valid file or fails fast with the first violation,
//! carrying the 1-based data-row number where one is known.

use csv::{ReaderBuilder, StringRecord};
use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

use super::record::{validate_field, EXPECTED_COLUMN_COUNT};

/// The thirteen required header names, in canonical form. Matching is
/// case-, quote-, and whitespace-insensitive and ignores column order.
pub const REQUIRED_HEADERS: [&str; EXPECTED_COLUMN_COUNT] = [
    "Unique ID",
    "Registered Company Name",
    "Company Number",
    "Trading Name",
    "First Name",
    "Last Name",
    "Date of Birth",
    "Property Name or Number",
    "Address Line 1",
    "Address Line 2",
    "City or Town",
    "Postcode",
    "Country",
];

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// A submitted file failed structural or field-level validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct CsvValidationError {
    pub message: String,
    /// 1-based data-row number (the header row is not counted), where known.
    pub row: Option<u64>,
}

impl CsvValidationError {
    fn structural(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            row: None,
        }
    }

    fn at_row(message: impl Into<String>, row: u64) -> Self {
        Self {
            message: message.into(),
            row: Some(row),
        }
    }
}

impl Display for CsvValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.row {
            Some(row) => write!(f, "{} at data row {}", self.message, row),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Reject input whose final quoted field is never closed.
///
/// The `csv` crate reads an unterminated quoted field silently to EOF, which
/// would swallow every later row (and can make a corrupt file pass), so the
/// quote balance is checked up front. Tracks RFC-4180 quoting: a quote opens
/// a field only at field start, and `""` inside a quoted field is an escape.
fn check_quote_balance(input: &[u8]) -> Result<(), CsvValidationError> {
    let mut field_start = true;
    let mut in_quotes = false;
    let mut newlines: u64 = 0;
    let mut opened_after: u64 = 0;
    let mut i = 0;
    while i < input.len() {
        let b = input[i];
        if in_quotes {
            if b == b'"' {
                if input.get(i + 1) == Some(&b'"') {
                    i += 2;
                    continue;
                }
                in_quotes = false;
                field_start = false;
            }
        } else {
            match b {
                b'"' if field_start => {
                    in_quotes = true;
                    opened_after = newlines;
                    field_start = false;
                }
                b',' => field_start = true,
                b'\n' => {
                    newlines += 1;
                    field_start = true;
                }
                b'\r' => field_start = true,
                _ => field_start = false,
            }
        }
        i += 1;
    }
    if in_quotes {
        let message = "malformed CSV record: unterminated quoted field";
        // Line 0 is the header row; data rows are 1-based from there.
        return Err(if opened_after == 0 {
            CsvValidationError::structural(message)
        } else {
            CsvValidationError::at_row(message, opened_after)
        });
    }
    Ok(())
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('"')
        .trim()
        .to_lowercase()
}

fn check_headers(header: &StringRecord) -> Result<(), CsvValidationError> {
    let present: HashSet<String> = header.iter().map(normalize_header).collect();
    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|required| !present.contains(&normalize_header(required)))
        .collect();
    if !missing.is_empty() {
        return Err(CsvValidationError::structural(format!(
            "missing required headers: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

fn validate_row(record: &StringRecord, row: u64) -> Result<(), CsvValidationError> {
    if record.len() != EXPECTED_COLUMN_COUNT {
        return Err(CsvValidationError::at_row(
            format!(
                "record has {} columns, expected {}",
                record.len(),
                EXPECTED_COLUMN_COUNT
            ),
            row,
        ));
    }
    for (index, value) in record.iter().enumerate() {
        validate_field(index, value).map_err(|e| CsvValidationError::at_row(e.0, row))?;
    }
    Ok(())
}

/// Validate a submitted CSV file.
///
/// Stages: strip a UTF-8 BOM, read the header row, check the required header
/// set, then walk every data row in order applying the column-count check and
/// the per-field rules. Stops at the first violation. A parse-level failure
/// (e.g. an unterminated quote) is reported at the data row reached so far.
pub fn validate_csv(bytes: &[u8]) -> Result<(), CsvValidationError> {
    let input = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    check_quote_balance(input)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    let mut records = reader.records();

    let header = match records.next() {
        None => return Err(CsvValidationError::structural("no records in file")),
        Some(Err(e)) => {
            return Err(CsvValidationError::structural(format!(
                "unparseable header row: {}",
                e
            )))
        }
        Some(Ok(record)) => record,
    };
    check_headers(&header)?;

    let mut row: u64 = 0;
    for result in records {
        row += 1;
        let record = result
            .map_err(|e| CsvValidationError::at_row(format!("malformed CSV record: {}", e), row))?;
        validate_row(&record, row)?;
    }
    if row == 0 {
        return Err(CsvValidationError::structural("no records after headers"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Unique ID,Registered Company Name,Company Number,Trading Name,First Name,Last Name,Date of Birth,Property Name or Number,Address Line 1,Address Line 2,City or Town,Postcode,Country";

    fn good_row() -> String {
        "X1,Acme Ltd,0123456,Acme,Jane,Doe,01022024,12,High Street,,London,EC1A 1BB,England"
            .to_string()
    }

    fn file_with_rows(rows: &[String]) -> Vec<u8> {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.into_bytes()
    }

    #[test]
    fn well_formed_multi_row_file_passes() {
        let bytes = file_with_rows(&[good_row(), good_row(), good_row()]);
        assert!(validate_csv(&bytes).is_ok());
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = b"\xef\xbb\xbf".to_vec();
        bytes.extend_from_slice(&file_with_rows(&[good_row()]));
        assert!(validate_csv(&bytes).is_ok());
    }

    #[test]
    fn empty_file_fails() {
        let err = validate_csv(b"").unwrap_err();
        assert_eq!(err.message, "no records in file");
        assert_eq!(err.row, None);
    }

    #[test]
    fn header_only_file_fails() {
        let err = validate_csv(HEADER.as_bytes()).unwrap_err();
        assert_eq!(err.message, "no records after headers");
    }

    #[test]
    fn missing_headers_are_listed_exactly() {
        let bytes = format!(
            "Unique ID,Registered Company Name,Company Number,Trading Name,First Name,Last Name,Date of Birth,Property Name or Number,Address Line 1,Address Line 2,City or Town\n{}",
            good_row()
        );
        let err = validate_csv(bytes.as_bytes()).unwrap_err();
        assert_eq!(err.message, "missing required headers: Postcode, Country");
    }

    #[test]
    fn header_match_is_case_quote_and_whitespace_insensitive() {
        let quoted_header = r#""unique id", REGISTERED COMPANY NAME ,company number,Trading Name,first name,Last Name,date of birth,Property Name or Number,address line 1,Address Line 2,city or town,POSTCODE,Country"#;
        let bytes = format!("{}\n{}", quoted_header, good_row());
        assert!(validate_csv(bytes.as_bytes()).is_ok());
    }

    #[test]
    fn extra_and_duplicate_headers_pass_the_header_check() {
        // Set containment only: a surplus header column is tolerated as long
        // as the data rows still carry exactly 13 columns.
        let bytes = format!("{},Unique ID\n{}", HEADER, good_row());
        assert!(validate_csv(bytes.as_bytes()).is_ok());

        // A row padded out to match the surplus header fails the count check.
        let bytes = format!("{},Unique ID\n{},X1", HEADER, good_row());
        let err = validate_csv(bytes.as_bytes()).unwrap_err();
        assert_eq!(err.message, "record has 14 columns, expected 13");
        assert_eq!(err.row, Some(1));
    }

    #[test]
    fn wrong_column_count_reports_received_and_expected() {
        let bytes = file_with_rows(&["only,three,columns".to_string()]);
        let err = validate_csv(&bytes).unwrap_err();
        assert_eq!(err.message, "record has 3 columns, expected 13");
        assert_eq!(err.row, Some(1));
    }

    #[test]
    fn column_count_check_precedes_field_rules() {
        // The first field would also fail (empty unique ID) but the column
        // count violation must win.
        let bytes = file_with_rows(&[",,,".to_string()]);
        let err = validate_csv(&bytes).unwrap_err();
        assert_eq!(err.message, "record has 4 columns, expected 13");
    }

    #[test]
    fn first_failing_field_wins_within_a_row() {
        // Both Unique ID (empty) and Date of Birth (malformed) are invalid;
        // the earlier column is reported.
        let row = ",Acme Ltd,0123456,Acme,Jane,Doe,1-2-2024,12,High Street,,London,EC1A 1BB,England";
        let bytes = file_with_rows(&[row.to_string()]);
        let err = validate_csv(&bytes).unwrap_err();
        assert_eq!(err.message, "Unique ID is not valid");
        assert_eq!(err.row, Some(1));
    }

    #[test]
    fn failure_reports_one_based_row_number() {
        let bad = "X2,Acme Ltd,0123456,Acme,Jane,Doe,01132026,12,High Street,,London,EC1A 1BB,England";
        let bytes = file_with_rows(&[good_row(), bad.to_string(), good_row()]);
        let err = validate_csv(&bytes).unwrap_err();
        assert_eq!(err.message, "Date of Birth format is incorrect");
        assert_eq!(err.row, Some(2));
        assert_eq!(
            err.to_string(),
            "Date of Birth format is incorrect at data row 2"
        );
    }

    #[test]
    fn field_at_exact_limit_passes_over_limit_fails() {
        let at_limit = format!(
            "X1,{},0123456,Acme,Jane,Doe,01022024,12,High Street,,London,EC1A 1BB,England",
            "c".repeat(160)
        );
        assert!(validate_csv(&file_with_rows(&[at_limit])).is_ok());

        let over_limit = format!(
            "X1,{},0123456,Acme,Jane,Doe,01022024,12,High Street,,London,EC1A 1BB,England",
            "c".repeat(161)
        );
        let err = validate_csv(&file_with_rows(&[over_limit])).unwrap_err();
        assert_eq!(
            err.message,
            "Registered Company Name is over 160 characters long"
        );
    }

    #[test]
    fn quoted_fields_with_embedded_commas_parse() {
        let row = r#"X1,"Acme, Ltd",0123456,Acme,Jane,Doe,01022024,12,High Street,,London,EC1A 1BB,England"#;
        let bytes = file_with_rows(&[row.to_string()]);
        assert!(validate_csv(&bytes).is_ok());
    }

    #[test]
    fn unterminated_quote_reports_parser_failure() {
        let row = r#"X1,"Acme Ltd,0123456,Acme,Jane,Doe,01022024,12,High Street,,London,EC1A 1BB,England"#;
        let bytes = file_with_rows(&[good_row(), row.to_string()]);
        let err = validate_csv(&bytes).unwrap_err();
        assert_eq!(err.message, "malformed CSV record: unterminated quoted field");
        assert_eq!(err.row, Some(2));
    }

    #[test]
    fn unterminated_quote_in_last_field_fails() {
        // A quote opened in the final field runs to EOF; the file must not
        // pass as valid.
        let row = r#"X1,Acme Ltd,0123456,Acme,Jane,Doe,01022024,12,High Street,,London,EC1A 1BB,"England"#;
        let bytes = file_with_rows(&[row.to_string()]);
        let err = validate_csv(&bytes).unwrap_err();
        assert_eq!(err.message, "malformed CSV record: unterminated quoted field");
        assert_eq!(err.row, Some(1));
    }

    #[test]
    fn unterminated_quote_is_not_reported_as_a_column_count_error() {
        // The swallowed remainder of the file must surface as a parser-level
        // failure, not as a short record.
        let row = r#"X1,"Acme"#;
        let bytes = file_with_rows(&[row.to_string(), good_row(), good_row()]);
        let err = validate_csv(&bytes).unwrap_err();
        assert_eq!(err.message, "malformed CSV record: unterminated quoted field");
        assert_eq!(err.row, Some(1));
    }

    #[test]
    fn escaped_quotes_inside_quoted_fields_are_balanced() {
        let row = r#"X1,"Acme ""The Works"" Ltd",0123456,Acme,Jane,Doe,01022024,12,High Street,,London,EC1A 1BB,England"#;
        let bytes = file_with_rows(&[row.to_string()]);
        assert!(validate_csv(&bytes).is_ok());
    }

    #[test]
    fn validation_stops_at_first_failing_row() {
        let bad_early = "only,three,columns".to_string();
        let bad_late =
            ",Acme Ltd,0123456,Acme,Jane,Doe,01022024,12,High Street,,London,EC1A 1BB,England"
                .to_string();
        let bytes = file_with_rows(&[bad_early, bad_late]);
        let err = validate_csv(&bytes).unwrap_err();
        assert_eq!(err.row, Some(1));
    }
}
