use crate::config::GeocodingConfig;
use crate::error::Result;
use crate::types::{Coordinates, GeocodeApi};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const NOMINATIM_PROVIDER: &str = "nominatim";

/// Best-match lookup against a Nominatim instance.
///
/// The public instance requires an identifying User-Agent; request pacing is
/// the pipeline's responsibility, identification is ours.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

/// One element of Nominatim's `/search` JSON response. Coordinates arrive
/// as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &GeocodingConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            &config.effective_user_agent(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// First place with numeric coordinates wins. Non-numeric or missing
    /// values disqualify the place rather than failing the lookup.
    fn best_match(places: &[NominatimPlace]) -> Option<Coordinates> {
        let place = places.first()?;
        let latitude: f64 = place.lat.trim().parse().ok()?;
        let longitude: f64 = place.lon.trim().parse().ok()?;
        Some(Coordinates {
            latitude,
            longitude,
        })
    }
}

#[async_trait::async_trait]
impl GeocodeApi for NominatimGeocoder {
    fn name(&self) -> &'static str {
        NOMINATIM_PROVIDER
    }

    #[instrument(skip(self))]
    async fn lookup(&self, query: &str) -> Result<Option<Coordinates>> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?;

        let places: Vec<NominatimPlace> = match response.json().await {
            Ok(places) => places,
            Err(e) => {
                warn!("Malformed response for query {:?}: {}", query, e);
                return Ok(None);
            }
        };

        match Self::best_match(&places) {
            Some(coordinates) => {
                debug!(
                    "Resolved {:?} to ({}, {}) via {:?}",
                    query,
                    coordinates.latitude,
                    coordinates.longitude,
                    places[0].display_name
                );
                Ok(Some(coordinates))
            }
            None => {
                debug!("No match for query {:?}", query);
                Ok(None)
            }
        }
    }
}
