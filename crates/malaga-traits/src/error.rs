//! Error types for the malaga engine.
//!
//! Only configuration and input-shape problems surface as errors. Numerical
//! trouble inside a scorer or the combiner degrades locally instead, see
//! [`crate::Fitted`].

use thiserror::Error;

/// The main error type for malaga operations.
#[derive(Debug, Error)]
pub enum MalagaError {
    /// A configuration value is out of range. Raised before any computation starts.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from the data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error when data is insufficient for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Two panels that must share an index do not.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Error from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for MalagaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for MalagaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for malaga operations.
pub type Result<T> = std::result::Result<T, MalagaError>;
