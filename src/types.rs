use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A resolved latitude/longitude pair as returned by a geocoding lookup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Bit-exact key for duplicate detection. Collisions are defined on the
    /// exact pair, so signed zeros and rounding differences stay distinct.
    pub fn bit_key(&self) -> (u64, u64) {
        (self.latitude.to_bits(), self.longitude.to_bits())
    }
}

/// One row of the uploaded base table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRecord {
    pub base_name: String,
    pub location_text: String,
    pub state: String,
    pub subdescription: String,
    pub image_number: String,
    pub branch: String,
    #[serde(default)]
    pub follow_up: bool,
}

/// A LocationRecord whose lookup succeeded. Both coordinates are always
/// present; rows that fail to resolve never become a GeocodedRecord.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodedRecord {
    #[serde(flatten)]
    pub record: LocationRecord,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeocodedRecord {
    pub fn new(record: LocationRecord, coordinates: Coordinates) -> Self {
        Self {
            record,
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Core trait every geocoding provider must implement
#[async_trait::async_trait]
pub trait GeocodeApi: Send + Sync {
    /// Provider identifier used in logs and metrics
    fn name(&self) -> &'static str;

    /// Resolve a free-text location to its best-match coordinates.
    /// `Ok(None)` means the provider had no match for the query; `Err` is a
    /// transport-level failure. The pipeline treats both as a miss for the
    /// record being looked up.
    async fn lookup(&self, query: &str) -> Result<Option<Coordinates>>;
}
