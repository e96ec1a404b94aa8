use clap::{Parser, Subcommand};
use tracing::info;

use base_geocoder::apis::NominatimGeocoder;
use base_geocoder::config::Config;
use base_geocoder::export;
use base_geocoder::logging;
use base_geocoder::pipeline::{format_duration, GeocodePipeline};
use base_geocoder::reader;
use base_geocoder::server::{self, AppContext};
use base_geocoder::session::{InMemorySessionStore, SessionStore};
use base_geocoder::types::GeocodeApi;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "base_geocoder")]
#[command(about = "WWII U.S. military base spreadsheet geocoder")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count rows and report the estimated geocoding time, without issuing lookups
    Estimate {
        /// CSV or XLSX file of base records
        file: PathBuf,
    },
    /// Geocode a spreadsheet and write the flagged result as CSV
    Geocode {
        /// CSV or XLSX file of base records
        file: PathBuf,
        /// Output CSV path
        #[arg(long, default_value = "data_with_follow_ups.csv")]
        output: PathBuf,
        /// Minimum spacing between lookups, overriding config.toml
        #[arg(long)]
        delay_seconds: Option<u64>,
    },
    /// Start the HTTP review surface
    Serve {
        /// Port to bind, overriding config.toml
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load_or_default();

    match cli.command {
        Commands::Estimate { file } => {
            let records = reader::read_path(&file)?;
            let min_delay = Duration::from_secs(config.geocoding.min_delay_seconds);
            let estimate = GeocodePipeline::estimate_duration(records.len(), min_delay);
            println!("Number of rows: {}", records.len());
            println!("Estimated time to geocode: {}", format_duration(estimate));
        }
        Commands::Geocode {
            file,
            output,
            delay_seconds,
        } => {
            let records = reader::read_path(&file)?;
            let min_delay =
                Duration::from_secs(delay_seconds.unwrap_or(config.geocoding.min_delay_seconds));

            println!("📄 Loaded {} rows from {}", records.len(), file.display());
            println!(
                "⏱️  Estimated time to geocode: {}",
                format_duration(GeocodePipeline::estimate_duration(records.len(), min_delay))
            );

            let geocoder: Arc<dyn GeocodeApi> =
                Arc::new(NominatimGeocoder::from_config(&config.geocoding)?);
            let pipeline = GeocodePipeline::new(geocoder, min_delay);
            let outcome = pipeline.run(records).await;

            println!("\n📊 Geocoding results:");
            println!("   Total records: {}", outcome.total_records);
            println!("   Resolved: {}", outcome.resolved);
            println!("   Dropped: {}", outcome.dropped);
            println!("   Flagged for follow-up: {}", outcome.flagged);

            let csv_bytes = export::geocoded_to_csv(&outcome.records)?;
            std::fs::write(&output, csv_bytes)?;
            info!(
                "Wrote {} records to {}",
                outcome.records.len(),
                output.display()
            );
            println!("💾 Saved geocoded records to {}", output.display());
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let geocoder: Arc<dyn GeocodeApi> =
                Arc::new(NominatimGeocoder::from_config(&config.geocoding)?);
            let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
            let context = Arc::new(AppContext { config, geocoder });
            server::start_server(store, context, port).await?;
        }
    }
    Ok(())
}
