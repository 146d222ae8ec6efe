//! Telemetry source abstraction.
//!
//! The live readings come from an external telemetry service; the HTTP
//! implementation lives in the api crate.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::models::Telemetry;

/// Errors that can occur while fetching telemetry.
///
/// Timeouts are reported as [`TelemetryError::Connection`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TelemetryError {
    /// No response was received from the telemetry service.
    #[error("Could not connect to telemetry service")]
    Connection,

    /// The telemetry service answered with an error.
    #[error("Telemetry service error: {0}")]
    Service(String),

    /// The request could not be built.
    #[error("Error setting up telemetry request: {0}")]
    RequestSetup(String),
}

/// Source of live telemetry readings.
#[async_trait::async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch the current reading of a single sensor.
    async fn fetch_by_sensor(&self, sensor_id: &str) -> Result<Telemetry, TelemetryError>;

    /// Fetch the current temperature reading at a location.
    async fn fetch_by_location(&self, location: &str) -> Result<Telemetry, TelemetryError>;
}

/// Mock telemetry source for development and testing.
///
/// Returns canned readings and records every requested key.
#[derive(Debug, Default)]
pub struct MockTelemetrySource {
    by_sensor: HashMap<String, Result<Telemetry, TelemetryError>>,
    by_location: HashMap<String, Result<Telemetry, TelemetryError>>,
    calls: Mutex<Vec<String>>,
}

impl MockTelemetrySource {
    /// Create a mock with no readings; every lookup fails with a service error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the outcome for a sensor id.
    pub fn with_sensor(
        mut self,
        sensor_id: impl Into<String>,
        outcome: Result<Telemetry, TelemetryError>,
    ) -> Self {
        self.by_sensor.insert(sensor_id.into(), outcome);
        self
    }

    /// Register the outcome for a location.
    pub fn with_location(
        mut self,
        location: impl Into<String>,
        outcome: Result<Telemetry, TelemetryError>,
    ) -> Self {
        self.by_location.insert(location.into(), outcome);
        self
    }

    /// Keys requested so far, as `sensor:<id>` or `location:<name>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, key: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(key);
        }
    }
}

#[async_trait::async_trait]
impl TelemetrySource for MockTelemetrySource {
    async fn fetch_by_sensor(&self, sensor_id: &str) -> Result<Telemetry, TelemetryError> {
        self.record(format!("sensor:{}", sensor_id));
        self.by_sensor.get(sensor_id).cloned().unwrap_or_else(|| {
            Err(TelemetryError::Service(format!(
                "Sensor with ID '{}' not found",
                sensor_id
            )))
        })
    }

    async fn fetch_by_location(&self, location: &str) -> Result<Telemetry, TelemetryError> {
        self.record(format!("location:{}", location));
        self.by_location
            .get(location)
            .cloned()
            .unwrap_or_else(|| Err(TelemetryError::Service("Unknown error".to_string())))
    }
}
