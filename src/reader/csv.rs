use super::{column_indices, record_from_row};
use crate::error::Result;
use crate::types::LocationRecord;

/// Read rows from CSV bytes. The first row is the header.
pub fn read_csv(bytes: &[u8]) -> Result<Vec<LocationRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let columns = column_indices(&headers)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let fields: Vec<String> = row.iter().map(|f| f.to_string()).collect();
        records.push(record_from_row(&fields, &columns));
    }
    Ok(records)
}
