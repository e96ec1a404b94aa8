use anyhow::Result;
use base_geocoder::error::GeocoderError;
use base_geocoder::reader;
use std::fs;

const HEADER: &str = "Military Base,Location,State,Subdescription,Image Number,Branch";

#[test]
fn reads_required_columns_from_csv() -> Result<()> {
    let csv = format!(
        "{HEADER}\nFort Lewis,\"Tacoma, Washington\",WA,Infantry training,123,Army\n"
    );
    let records = reader::read_records("bases.csv", csv.as_bytes())?;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.base_name, "Fort Lewis");
    assert_eq!(record.location_text, "Tacoma, Washington");
    assert_eq!(record.state, "WA");
    assert_eq!(record.subdescription, "Infantry training");
    assert_eq!(record.image_number, "123");
    assert_eq!(record.branch, "Army");
    assert!(!record.follow_up);
    Ok(())
}

#[test]
fn columns_are_matched_by_name_and_extras_discarded() -> Result<()> {
    let csv = "Branch,Notes,Location,Military Base,State,Subdescription,Image Number\n\
               Navy,ignore me,\"San Diego, California\",Naval Base San Diego,CA,Fleet,77\n";
    let records = reader::read_records("bases.csv", csv.as_bytes())?;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].base_name, "Naval Base San Diego");
    assert_eq!(records[0].branch, "Navy");
    assert_eq!(records[0].image_number, "77");
    Ok(())
}

#[test]
fn missing_column_is_a_schema_mismatch() {
    let csv = "Military Base,Location,State,Subdescription,Image Number\n\
               Fort Lewis,Tacoma,WA,Infantry,123\n";
    let err = reader::read_records("bases.csv", csv.as_bytes()).unwrap_err();

    assert!(matches!(err, GeocoderError::SchemaMismatch(_)));
    assert!(err.to_string().contains("Branch"));
}

#[test]
fn location_whitespace_is_normalized() -> Result<()> {
    let csv = format!("{HEADER}\nFort Sill,\"  Fort   Sill,\n Oklahoma \",OK,Artillery,9,Army\n");
    let records = reader::read_records("bases.csv", csv.as_bytes())?;

    assert_eq!(records[0].location_text, "Fort Sill, Oklahoma");
    Ok(())
}

#[test]
fn unknown_extension_is_rejected() {
    let err = reader::read_records("bases.pdf", b"whatever").unwrap_err();
    assert!(matches!(err, GeocoderError::UnsupportedFileType(_)));
}

#[test]
fn reads_a_spreadsheet_from_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bases.csv");
    fs::write(
        &path,
        format!("{HEADER}\nCamp Cooke,\"Lompoc, California\",CA,Armor,55,Army\n"),
    )?;

    let records = reader::read_path(&path)?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].base_name, "Camp Cooke");
    Ok(())
}

#[test]
fn empty_table_yields_no_records() -> Result<()> {
    let records = reader::read_records("bases.csv", format!("{HEADER}\n").as_bytes())?;
    assert!(records.is_empty());
    Ok(())
}
