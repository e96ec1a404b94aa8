use crate::throttle::Throttle;
use crate::types::{Coordinates, GeocodeApi, GeocodedRecord, LocationRecord};
use metrics::{counter, histogram};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Result of a complete geocoding run
#[derive(Debug, Serialize)]
pub struct PipelineOutcome {
    pub provider: String,
    pub total_records: usize,
    pub resolved: usize,
    pub dropped: usize,
    pub flagged: usize,
    pub records: Vec<GeocodedRecord>,
    pub duration_seconds: f64,
}

/// Sequential, throttled geocoding over an ordered batch of records.
///
/// Each record is either resolved (coordinates attached) or dropped (lookup
/// missed); a dropped record is permanently excluded from the run's output.
pub struct GeocodePipeline {
    geocoder: Arc<dyn GeocodeApi>,
    throttle: Throttle,
}

impl GeocodePipeline {
    pub fn new(geocoder: Arc<dyn GeocodeApi>, min_delay: Duration) -> Self {
        Self::with_throttle(geocoder, Throttle::new(min_delay))
    }

    pub fn with_throttle(geocoder: Arc<dyn GeocodeApi>, throttle: Throttle) -> Self {
        Self { geocoder, throttle }
    }

    /// Expected wall-clock time for a run: one paced lookup per record.
    pub fn estimate_duration(record_count: usize, min_delay: Duration) -> Duration {
        min_delay * record_count as u32
    }

    /// Geocode every record in input order. Individual lookup failures drop
    /// the record and the batch continues; a total outage yields an empty
    /// outcome, not an error.
    #[instrument(skip(self, records), fields(provider = %self.geocoder.name()))]
    pub async fn run(&self, records: Vec<LocationRecord>) -> PipelineOutcome {
        let provider = self.geocoder.name().to_string();
        let total_records = records.len();
        info!("Starting geocoding run over {} records", total_records);
        counter!("geocoder_pipeline_runs_total", "provider" => provider.clone()).increment(1);
        let t_run = std::time::Instant::now();

        let mut resolved: Vec<(LocationRecord, Coordinates)> = Vec::with_capacity(total_records);
        let mut dropped = 0usize;

        for (i, record) in records.into_iter().enumerate() {
            self.throttle.acquire().await;

            let t_lookup = std::time::Instant::now();
            let outcome = self.geocoder.lookup(&record.location_text).await;
            histogram!("geocoder_lookup_duration_seconds", "provider" => provider.clone())
                .record(t_lookup.elapsed().as_secs_f64());

            match outcome {
                Ok(Some(coordinates)) => {
                    debug!(
                        "Resolved {:?} to ({}, {})",
                        record.location_text, coordinates.latitude, coordinates.longitude
                    );
                    counter!("geocoder_lookups_total", "provider" => provider.clone(), "outcome" => "resolved")
                        .increment(1);
                    resolved.push((record, coordinates));
                }
                Ok(None) => {
                    warn!(
                        "No match for {:?} (row {}), dropping record",
                        record.location_text, i
                    );
                    counter!("geocoder_lookups_total", "provider" => provider.clone(), "outcome" => "miss")
                        .increment(1);
                    dropped += 1;
                }
                Err(e) => {
                    // A transport failure counts as a miss for this record;
                    // the batch continues.
                    warn!(
                        "Lookup failed for {:?} (row {}): {}",
                        record.location_text, i, e
                    );
                    counter!("geocoder_lookups_total", "provider" => provider.clone(), "outcome" => "error")
                        .increment(1);
                    dropped += 1;
                }
            }

            if (i + 1) % 10 == 0 {
                println!("   Geocoded {}/{} records", i + 1, total_records);
            }
        }

        let records = flag_duplicate_coordinates(resolved);
        let flagged = records.iter().filter(|r| r.record.follow_up).count();
        let duration_seconds = t_run.elapsed().as_secs_f64();

        info!(
            "Geocoding run finished: {} resolved, {} dropped, {} flagged for follow-up",
            records.len(),
            dropped,
            flagged
        );
        counter!("geocoder_records_dropped_total", "provider" => provider.clone())
            .increment(dropped as u64);
        counter!("geocoder_records_flagged_total", "provider" => provider.clone())
            .increment(flagged as u64);
        histogram!("geocoder_pipeline_duration_seconds", "provider" => provider.clone())
            .record(duration_seconds);

        PipelineOutcome {
            provider,
            total_records,
            resolved: records.len(),
            dropped,
            flagged,
            records,
            duration_seconds,
        }
    }
}

/// Records sharing an exact coordinate pair with at least one other record
/// are all marked for follow-up. Input order is preserved.
fn flag_duplicate_coordinates(
    resolved: Vec<(LocationRecord, Coordinates)>,
) -> Vec<GeocodedRecord> {
    let mut occurrences: HashMap<(u64, u64), usize> = HashMap::new();
    for (_, coordinates) in &resolved {
        *occurrences.entry(coordinates.bit_key()).or_insert(0) += 1;
    }

    resolved
        .into_iter()
        .map(|(mut record, coordinates)| {
            if occurrences[&coordinates.bit_key()] >= 2 {
                record.follow_up = true;
            }
            GeocodedRecord::new(record, coordinates)
        })
        .collect()
}

/// Render a duration as "N minutes and M seconds" for operator display.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!(
        "{} {} and {} {}",
        minutes,
        unit(minutes, "minute"),
        seconds,
        unit(seconds, "second")
    )
}

fn unit(count: u64, singular: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        format!("{}s", singular)
    }
}
