/// Error types for the reference catalogue and occurrence client
use thiserror::Error;

/// Main error type for catalogue and GBIF operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to parse JSON data
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Coordinates in a catalogue row were rejected
    #[error("Invalid location in catalogue: {0}")]
    Location(#[from] rbw_utils::error::ValidationError),
}

/// Type alias for Results using CatalogError
pub type Result<T> = std::result::Result<T, CatalogError>;
