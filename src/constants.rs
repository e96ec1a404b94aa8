/// Column name constants to ensure consistency across reader, export, and tests.
/// These are the exact header names the upstream spreadsheets use.

// Required input columns
pub const MILITARY_BASE_COLUMN: &str = "Military Base";
pub const LOCATION_COLUMN: &str = "Location";
pub const STATE_COLUMN: &str = "State";
pub const SUBDESCRIPTION_COLUMN: &str = "Subdescription";
pub const IMAGE_NUMBER_COLUMN: &str = "Image Number";
pub const BRANCH_COLUMN: &str = "Branch";

// Columns the pipeline adds on top of the input set
pub const FOLLOW_UP_COLUMN: &str = "Follow Up";
pub const LATITUDE_COLUMN: &str = "latitude_geocoded";
pub const LONGITUDE_COLUMN: &str = "longitude_geocoded";

/// File name of the CSV artifact offered for download
pub const EXPORT_FILE_NAME: &str = "data_with_follow_ups.csv";

// Geocoding provider defaults
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "base_geocoder/0.1";
pub const DEFAULT_MIN_DELAY_SECONDS: u64 = 2;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// The columns every uploaded table must carry before the pipeline starts
pub fn required_columns() -> Vec<&'static str> {
    vec![
        MILITARY_BASE_COLUMN,
        LOCATION_COLUMN,
        STATE_COLUMN,
        SUBDESCRIPTION_COLUMN,
        IMAGE_NUMBER_COLUMN,
        BRANCH_COLUMN,
    ]
}
