/// Error types for the scoring engine
use rbw_utils::error::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoringError {
    /// Malformed or missing input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The catalogue has no stations to compare against
    #[error("Catalogue has no monitoring stations")]
    NoStations,
}

/// Type alias for Results using ScoringError
pub type Result<T> = std::result::Result<T, ScoringError>;
