use crate::constants;
use crate::error::{GeocoderError, Result};
use crate::types::{GeocodedRecord, LocationRecord};

/// Serialize a not-yet-geocoded dataset to CSV with a header row.
pub fn records_to_csv(records: &[LocationRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(base_headers())?;
    for record in records {
        writer.write_record(&row_fields(record))?;
    }
    finish(writer)
}

/// Serialize a geocoded dataset to CSV. Coordinate columns carry the names
/// the downstream mapping tooling expects.
pub fn geocoded_to_csv(records: &[GeocodedRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut headers = base_headers();
    headers.push(constants::LATITUDE_COLUMN);
    headers.push(constants::LONGITUDE_COLUMN);
    writer.write_record(&headers)?;

    for record in records {
        let mut fields = row_fields(&record.record);
        fields.push(record.latitude.to_string());
        fields.push(record.longitude.to_string());
        writer.write_record(&fields)?;
    }
    finish(writer)
}

fn base_headers() -> Vec<&'static str> {
    vec![
        constants::MILITARY_BASE_COLUMN,
        constants::LOCATION_COLUMN,
        constants::STATE_COLUMN,
        constants::SUBDESCRIPTION_COLUMN,
        constants::IMAGE_NUMBER_COLUMN,
        constants::BRANCH_COLUMN,
        constants::FOLLOW_UP_COLUMN,
    ]
}

fn row_fields(record: &LocationRecord) -> Vec<String> {
    vec![
        record.base_name.clone(),
        record.location_text.clone(),
        record.state.clone(),
        record.subdescription.clone(),
        record.image_number.clone(),
        record.branch.clone(),
        record.follow_up.to_string(),
    ]
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|e| GeocoderError::Api {
        message: format!("CSV buffer error: {}", e),
    })
}
