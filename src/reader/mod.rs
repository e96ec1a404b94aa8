//! Tabular file reading for uploaded base spreadsheets.
//!
//! CSV and XLSX are supported, dispatched on the file extension. The reader
//! keeps exactly the columns the pipeline consumes and validates their
//! presence before any lookup is issued.

mod csv;
mod xlsx;

pub use self::csv::read_csv;
pub use self::xlsx::read_xlsx;

use crate::constants;
use crate::error::{GeocoderError, Result};
use crate::types::LocationRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Read records from in-memory file bytes, dispatching on the extension of
/// the uploaded file name.
pub fn read_records(file_name: &str, bytes: &[u8]) -> Result<Vec<LocationRecord>> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let records = match extension.as_str() {
        "csv" => read_csv(bytes)?,
        "xlsx" => read_xlsx(bytes)?,
        _ => {
            return Err(GeocoderError::UnsupportedFileType(format!(
                "{} (expected .csv or .xlsx)",
                file_name
            )))
        }
    };

    debug!("Read {} records from {}", records.len(), file_name);
    Ok(records)
}

/// Convenience for the CLI: read a spreadsheet from disk.
pub fn read_path(path: &Path) -> Result<Vec<LocationRecord>> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    read_records(file_name, &bytes)
}

/// Positions of the required columns within a header row
#[derive(Debug)]
pub(crate) struct ColumnIndices {
    base_name: usize,
    location: usize,
    state: usize,
    subdescription: usize,
    image_number: usize,
    branch: usize,
}

/// Map header names to their positions. Every required column must be
/// present; anything else in the header is ignored.
pub(crate) fn column_indices(headers: &[String]) -> Result<ColumnIndices> {
    let mut missing: Vec<&str> = Vec::new();
    let mut find = |name: &'static str| match headers.iter().position(|h| h.trim() == name) {
        Some(index) => index,
        None => {
            missing.push(name);
            0
        }
    };

    let indices = ColumnIndices {
        base_name: find(constants::MILITARY_BASE_COLUMN),
        location: find(constants::LOCATION_COLUMN),
        state: find(constants::STATE_COLUMN),
        subdescription: find(constants::SUBDESCRIPTION_COLUMN),
        image_number: find(constants::IMAGE_NUMBER_COLUMN),
        branch: find(constants::BRANCH_COLUMN),
    };

    if !missing.is_empty() {
        return Err(GeocoderError::SchemaMismatch(missing.join(", ")));
    }
    Ok(indices)
}

pub(crate) fn record_from_row(row: &[String], columns: &ColumnIndices) -> LocationRecord {
    let field = |index: usize| row.get(index).map(|v| v.trim().to_string()).unwrap_or_default();

    LocationRecord {
        base_name: field(columns.base_name),
        location_text: normalize_location(&field(columns.location)),
        state: field(columns.state),
        subdescription: field(columns.subdescription),
        image_number: field(columns.image_number),
        branch: field(columns.branch),
        follow_up: false,
    }
}

/// Collapse whitespace runs so lookup keys are stable across messy cells.
pub(crate) fn normalize_location(raw: &str) -> String {
    WHITESPACE.replace_all(raw.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_internal_and_surrounding_whitespace() {
        assert_eq!(
            normalize_location("  Fort   Sill\n Oklahoma "),
            "Fort Sill Oklahoma"
        );
        assert_eq!(normalize_location("El Paso, Texas"), "El Paso, Texas");
        assert_eq!(normalize_location(""), "");
    }

    #[test]
    fn reports_every_missing_column() {
        let headers: Vec<String> = vec!["Location".to_string(), "State".to_string()];
        let err = column_indices(&headers).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(constants::MILITARY_BASE_COLUMN));
        assert!(message.contains(constants::BRANCH_COLUMN));
        assert!(!message.contains(constants::STATE_COLUMN));
    }
}
