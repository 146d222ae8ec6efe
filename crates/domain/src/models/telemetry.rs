//! Telemetry reading model.
//!
//! Readings are never persisted; they are fetched from the telemetry
//! service, merged into a sensor for one response and dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single live reading reported by the telemetry service.
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub sensor_id: String,
    pub sensor_type: String,
    pub unit: String,
    pub location: String,
    pub value: Option<f64>,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Flat response body for telemetry looked up by location.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationTelemetryResponse {
    pub location: String,
    pub value: Option<f64>,
    pub unit: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub sensor_id: String,
}

impl From<Telemetry> for LocationTelemetryResponse {
    fn from(t: Telemetry) -> Self {
        Self {
            location: t.location,
            value: t.value,
            unit: t.unit,
            status: t.status,
            timestamp: t.timestamp,
            sensor_type: t.sensor_type,
            sensor_id: t.sensor_id,
        }
    }
}
