//! Routing error type.
//!
//! None of these reach the user: the route model treats every variant as
//! "no route" and falls back to a straight line.

use thiserror::Error;

/// Errors produced while obtaining a walking route.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("routing service returned HTTP {status}")]
    Status { status: u16 },

    #[error("routing service returned no route")]
    NoRoute { message: Option<String> },

    #[error("malformed routing response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("routing client configuration error: {0}")]
    Config(String),
}

pub type RouteResult<T> = Result<T, RouteError>;
