use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocoderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required column(s): {0}")]
    SchemaMismatch(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Session not found: {0}")]
    SessionNotFound(uuid::Uuid),

    #[error("API error: {message}")]
    Api { message: String },
}

pub type Result<T> = std::result::Result<T, GeocoderError>;
