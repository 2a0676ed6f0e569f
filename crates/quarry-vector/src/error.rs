//! Error types for quarry-vector.

use thiserror::Error;

/// Result type for quarry-vector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quarry-vector operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Vector length does not match the index dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the index was constructed with.
        expected: usize,
        /// Length of the vector provided.
        actual: usize,
    },

    /// Invalid vector (e.g., contains NaN or infinity).
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// The index could not be opened and is running in degraded mode.
    #[error("Vector index unavailable: {0}")]
    Unavailable(String),

    /// Persistence error (serialization, inconsistent file contents).
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
