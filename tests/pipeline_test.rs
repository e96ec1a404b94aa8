use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use base_geocoder::error::{GeocoderError, Result as GeocoderResult};
use base_geocoder::pipeline::GeocodePipeline;
use base_geocoder::throttle::Throttle;
use base_geocoder::types::{Coordinates, GeocodeApi, LocationRecord};

/// Table-driven stand-in for the live provider.
struct StubGeocoder {
    answers: HashMap<String, Option<Coordinates>>,
    fail_all: bool,
}

impl StubGeocoder {
    fn new(answers: Vec<(&str, Option<(f64, f64)>)>) -> Self {
        let answers = answers
            .into_iter()
            .map(|(query, coords)| {
                (
                    query.to_string(),
                    coords.map(|(latitude, longitude)| Coordinates {
                        latitude,
                        longitude,
                    }),
                )
            })
            .collect();
        Self {
            answers,
            fail_all: false,
        }
    }

    fn failing() -> Self {
        Self {
            answers: HashMap::new(),
            fail_all: true,
        }
    }
}

#[async_trait]
impl GeocodeApi for StubGeocoder {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn lookup(&self, query: &str) -> GeocoderResult<Option<Coordinates>> {
        if self.fail_all {
            return Err(GeocoderError::Api {
                message: "provider unreachable".to_string(),
            });
        }
        Ok(self.answers.get(query).copied().flatten())
    }
}

fn record(base: &str, location: &str) -> LocationRecord {
    LocationRecord {
        base_name: base.to_string(),
        location_text: location.to_string(),
        state: "WA".to_string(),
        subdescription: "Training".to_string(),
        image_number: "1".to_string(),
        branch: "Army".to_string(),
        follow_up: false,
    }
}

fn pipeline(stub: StubGeocoder) -> GeocodePipeline {
    GeocodePipeline::with_throttle(Arc::new(stub), Throttle::new(Duration::ZERO))
}

#[tokio::test]
async fn colliding_coordinates_are_flagged_and_misses_dropped() -> Result<()> {
    let stub = StubGeocoder::new(vec![
        ("Fort X", Some((47.0, -122.0))),
        ("INVALID_ZZZ", None),
        ("Fort Y", Some((47.0, -122.0))),
    ]);
    let outcome = pipeline(stub)
        .run(vec![
            record("Fort X", "Fort X"),
            record("Unknown", "INVALID_ZZZ"),
            record("Fort Y", "Fort Y"),
        ])
        .await;

    assert_eq!(outcome.total_records, 3);
    assert_eq!(outcome.resolved, 2);
    assert_eq!(outcome.dropped, 1);
    assert_eq!(outcome.flagged, 2);

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0].record.base_name, "Fort X");
    assert_eq!(outcome.records[1].record.base_name, "Fort Y");
    assert!(outcome.records.iter().all(|r| r.record.follow_up));
    assert_eq!(
        outcome.records[0].coordinates(),
        outcome.records[1].coordinates()
    );
    Ok(())
}

#[tokio::test]
async fn total_outage_yields_an_empty_outcome() {
    let outcome = pipeline(StubGeocoder::failing())
        .run(vec![
            record("Fort X", "Fort X"),
            record("Fort Y", "Fort Y"),
        ])
        .await;

    assert_eq!(outcome.total_records, 2);
    assert_eq!(outcome.dropped, 2);
    assert!(outcome.records.is_empty());
}

#[tokio::test]
async fn distinct_coordinates_stay_unflagged() {
    let stub = StubGeocoder::new(vec![
        ("Fort X", Some((47.0, -122.0))),
        ("Fort Y", Some((31.8, -106.4))),
        ("Fort Z", Some((35.2, -98.6))),
    ]);
    let outcome = pipeline(stub)
        .run(vec![
            record("Fort X", "Fort X"),
            record("Fort Y", "Fort Y"),
            record("Fort Z", "Fort Z"),
        ])
        .await;

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.flagged, 0);
    assert!(outcome.records.iter().all(|r| !r.record.follow_up));
}

#[tokio::test]
async fn survivor_order_matches_input_order() {
    let stub = StubGeocoder::new(vec![
        ("A", Some((1.0, 1.0))),
        ("B", None),
        ("C", Some((3.0, 3.0))),
        ("D", None),
        ("E", Some((5.0, 5.0))),
    ]);
    let outcome = pipeline(stub)
        .run(vec![
            record("Base A", "A"),
            record("Base B", "B"),
            record("Base C", "C"),
            record("Base D", "D"),
            record("Base E", "E"),
        ])
        .await;

    let names: Vec<&str> = outcome
        .records
        .iter()
        .map(|r| r.record.base_name.as_str())
        .collect();
    assert_eq!(names, vec!["Base A", "Base C", "Base E"]);
}

#[tokio::test]
async fn output_never_exceeds_input() {
    let stub = StubGeocoder::new(vec![("A", Some((1.0, 1.0))), ("B", None)]);
    let outcome = pipeline(stub)
        .run(vec![
            record("Base A", "A"),
            record("Base B", "B"),
            record("Base B again", "B"),
        ])
        .await;

    assert!(outcome.records.len() <= outcome.total_records);
    assert_eq!(outcome.resolved + outcome.dropped, outcome.total_records);
}

#[tokio::test]
async fn empty_input_is_an_empty_outcome() {
    let outcome = pipeline(StubGeocoder::new(Vec::new())).run(Vec::new()).await;

    assert_eq!(outcome.total_records, 0);
    assert_eq!(outcome.resolved, 0);
    assert_eq!(outcome.dropped, 0);
    assert!(outcome.records.is_empty());
}
