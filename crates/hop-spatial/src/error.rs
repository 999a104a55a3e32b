//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `hop-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("CSV parse error: {0}")]
    Parse(String),

    #[error("stop {id} has invalid coordinates ({lat}, {lng})")]
    InvalidCoordinate { id: String, lat: f64, lng: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
