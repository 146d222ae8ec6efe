//! Domain error types.

use thiserror::Error;

use crate::services::{StoreError, TelemetryError};

/// Errors surfaced by [`crate::services::SensorService`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SensorError {
    /// The payload broke one or more validation rules.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Sensor not found")]
    NotFound,

    #[error("{0}")]
    Store(String),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

impl From<StoreError> for SensorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => SensorError::NotFound,
            StoreError::Database(message) => SensorError::Store(message),
        }
    }
}
