//! Sensor domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

/// Status assigned to every newly created sensor.
pub const DEFAULT_SENSOR_STATUS: &str = "inactive";

/// Error codes in the order violations are reported.
const VIOLATION_ORDER: [&str; 5] = [
    "name_required",
    "type_required",
    "invalid_type",
    "location_required",
    "unit_required",
];

/// Supported sensor types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Temperature,
    Humidity,
    Light,
    Motion,
    AirQuality,
    Pressure,
}

impl SensorType {
    /// Every supported type, in the order they are advertised to clients.
    pub const ALL: [SensorType; 6] = [
        SensorType::Temperature,
        SensorType::Humidity,
        SensorType::Light,
        SensorType::Motion,
        SensorType::AirQuality,
        SensorType::Pressure,
    ];

    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::Light => "light",
            SensorType::Motion => "motion",
            SensorType::AirQuality => "air_quality",
            SensorType::Pressure => "pressure",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    fn allowed_values() -> Vec<&'static str> {
        Self::ALL.iter().map(SensorType::as_str).collect()
    }
}

impl std::fmt::Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a live telemetry lookup attached to a listed sensor.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryStatus {
    Updated,
    Error,
}

/// A sensor as stored, optionally enriched with live telemetry.
#[derive(Debug, Clone, Serialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub id: i32,

    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[serde(rename = "type")]
    pub sensor_type: SensorType,

    #[validate(custom(function = "validate_location"))]
    pub location: String,

    pub value: Option<f64>,

    #[validate(custom(function = "validate_unit"))]
    pub unit: String,

    pub status: String,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,

    /// Set only on enriched list responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry_status: Option<TelemetryStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry_error: Option<String>,
}

impl Sensor {
    pub fn is_temperature(&self) -> bool {
        self.sensor_type == SensorType::Temperature
    }
}

/// Request payload for creating a sensor.
///
/// Missing and `null` fields deserialize to empty strings so that every
/// violation is reported by [`violations`] rather than by the JSON decoder.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SensorCreate {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[serde(default, rename = "type", deserialize_with = "null_as_empty")]
    #[validate(custom(function = "validate_sensor_type"))]
    pub sensor_type: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "validate_location"))]
    pub location: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "validate_unit"))]
    pub unit: String,
}

/// Request payload for updating a sensor (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SensorUpdate {
    pub name: Option<String>,

    #[serde(rename = "type")]
    #[validate(custom(function = "validate_optional_sensor_type"))]
    pub sensor_type: Option<String>,

    pub location: Option<String>,

    /// `Some(None)` when the payload carries an explicit `null`.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub value: Option<Option<f64>>,

    pub unit: Option<String>,

    pub status: Option<String>,
}

/// A single column assignment derived from a [`SensorUpdate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorChange<'a> {
    Name(&'a str),
    Type(&'a str),
    Location(&'a str),
    Value(Option<f64>),
    Unit(&'a str),
    Status(&'a str),
}

impl SensorChange<'_> {
    /// Column name in the sensors table.
    pub fn column(&self) -> &'static str {
        match self {
            SensorChange::Name(_) => "name",
            SensorChange::Type(_) => "type",
            SensorChange::Location(_) => "location",
            SensorChange::Value(_) => "value",
            SensorChange::Unit(_) => "unit",
            SensorChange::Status(_) => "status",
        }
    }
}

impl SensorUpdate {
    /// Returns the assignments this update carries.
    ///
    /// Text fields count only when non-empty; `value` counts whenever the key
    /// was present, including an explicit `null`. Omitted fields never appear.
    pub fn changes(&self) -> Vec<SensorChange<'_>> {
        fn text(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|s| !s.is_empty())
        }

        let mut changes = Vec::new();
        if let Some(name) = text(&self.name) {
            changes.push(SensorChange::Name(name));
        }
        if let Some(sensor_type) = text(&self.sensor_type) {
            changes.push(SensorChange::Type(sensor_type));
        }
        if let Some(location) = text(&self.location) {
            changes.push(SensorChange::Location(location));
        }
        if let Some(value) = self.value {
            changes.push(SensorChange::Value(value));
        }
        if let Some(unit) = text(&self.unit) {
            changes.push(SensorChange::Unit(unit));
        }
        if let Some(status) = text(&self.status) {
            changes.push(SensorChange::Status(status));
        }
        changes
    }
}

/// Request payload for `PATCH /sensors/:id/value`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorValueUpdate {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub value: Option<Option<f64>>,

    pub status: Option<String>,
}

impl SensorValueUpdate {
    /// Returns `(value, status)` when both are supplied.
    ///
    /// A zero value is a valid reading; only an absent key counts as missing.
    pub fn required_fields(&self) -> Option<(Option<f64>, &str)> {
        let value = self.value?;
        let status = self.status.as_deref().filter(|s| !s.is_empty())?;
        Some((value, status))
    }
}

/// Runs the validators on a candidate and returns every violation message,
/// or `None` when the candidate is well-formed.
pub fn violations<T: Validate>(candidate: &T) -> Option<Vec<String>> {
    candidate
        .validate()
        .err()
        .map(|errors| shared::validation::ordered_messages(&errors, &VIOLATION_ORDER))
}

/// Parses a sensor id path segment.
pub fn parse_sensor_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    shared::validation::require_text(name, "name_required", "Name is required")
}

fn validate_location(location: &str) -> Result<(), ValidationError> {
    shared::validation::require_text(location, "location_required", "Location is required")
}

fn validate_unit(unit: &str) -> Result<(), ValidationError> {
    shared::validation::require_text(unit, "unit_required", "Unit is required")
}

/// Only an empty type counts as missing; a blank one is an unknown type.
fn validate_sensor_type(sensor_type: &str) -> Result<(), ValidationError> {
    if sensor_type.is_empty() {
        return shared::validation::require_text(sensor_type, "type_required", "Type is required");
    }
    validate_optional_sensor_type(sensor_type)
}

fn validate_optional_sensor_type(sensor_type: &str) -> Result<(), ValidationError> {
    if sensor_type.is_empty() {
        return Ok(());
    }
    shared::validation::require_one_of(
        sensor_type,
        &SensorType::allowed_values(),
        "invalid_type",
        "Type",
    )
}
