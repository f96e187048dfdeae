//! Error types for Fractal Garden.

use thiserror::Error;

/// Error type for garden operations outside the tick loop.
///
/// The tick loop itself never fails.
#[derive(Debug, Error)]
pub enum GardenError {
    /// No definition registered under a species name
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),
}

/// Result type alias for garden operations.
pub type GardenResult<T> = Result<T, GardenError>;
