//! Crate-wide error handling

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RookiecastError>;

/// Errors produced by the pipeline stages
#[derive(Error, Debug)]
pub enum RookiecastError {
    /// Missing or malformed column (label absent, label outside {0,1}, ...)
    #[error("schema error in column '{column}': {detail}")]
    SchemaError { column: String, detail: String },

    /// Dataset unusable after cleaning (no rows left, a class with zero members)
    #[error("data quality error: {0}")]
    DataQualityError(String),

    /// Array dimensions do not line up
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    /// Prediction requested before fit
    #[error("model has not been fitted")]
    ModelNotFitted,

    /// Invalid argument or configuration value
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Numerical procedure failed (singular system, diverged solver)
    #[error("computation error: {0}")]
    ComputationError(String),

    /// DataFrame-level failure (load, cast, column ops)
    #[error("data error: {0}")]
    DataError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<polars::prelude::PolarsError> for RookiecastError {
    fn from(e: polars::prelude::PolarsError) -> Self {
        RookiecastError::DataError(e.to_string())
    }
}
