use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Validate that a spreadsheet carries the columns the geocoding pipeline
/// requires, without issuing any lookups.
#[derive(Parser, Debug)]
#[command(name = "check-columns", version, about = "Validate spreadsheet columns before geocoding")]
struct Cli {
    /// Path to the CSV or XLSX file to check
    path: PathBuf,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let result = base_geocoder::reader::read_path(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()));

    match result {
        Ok(records) => {
            println!("valid ({} rows)", records.len());
            Ok(())
        }
        Err(e) => {
            eprintln!("invalid: {:#}", e);
            eprintln!(
                "required columns: {}",
                base_geocoder::constants::required_columns().join(", ")
            );
            std::process::exit(1)
        }
    }
}
