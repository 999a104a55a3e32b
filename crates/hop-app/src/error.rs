use hop_route::RouteError;
use hop_spatial::SpatialError;
use hop_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("location permission denied")]
    PermissionDenied,

    #[error("no stop selected")]
    NoSelection,

    #[error("unknown stop {0}")]
    UnknownStop(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stop data error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("routing client error: {0}")]
    Route(#[from] RouteError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type AppResult<T> = Result<T, AppError>;
