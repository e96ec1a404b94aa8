use super::{column_indices, record_from_row};
use crate::error::{GeocoderError, Result};
use crate::types::LocationRecord;
use calamine::{Data, DataType, Reader, Xlsx};
use std::io::Cursor;

/// Read rows from the first worksheet of an XLSX workbook. The first row is
/// the header; numeric cells (image numbers in particular) are stringified.
pub fn read_xlsx(bytes: &[u8]) -> Result<Vec<LocationRecord>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| GeocoderError::Api {
            message: "No worksheet found in workbook".to_string(),
        })??;

    let mut rows = range.rows().map(cells_to_strings);
    let headers = match rows.next() {
        Some(headers) => headers,
        None => {
            return Err(GeocoderError::Api {
                message: "Worksheet has no header row".to_string(),
            })
        }
    };
    let columns = column_indices(&headers)?;

    Ok(rows.map(|row| record_from_row(&row, &columns)).collect())
}

fn cells_to_strings(row: &[Data]) -> Vec<String> {
    row.iter()
        .map(|cell| {
            cell.as_string()
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("{}", cell))
        })
        .collect()
}
