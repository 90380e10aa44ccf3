//! Error types for the posture engine

use thiserror::Error;

use crate::schema::ValidationError;

/// Errors raised by the layers around the pure scoring core
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to parse detection payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid detection: {0}")]
    InvalidDetection(#[from] ValidationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid sort key: {0} (expected \"level\" or \"score\")")]
    InvalidSortKey(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
