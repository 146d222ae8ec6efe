//! Sensor entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Sensor, SensorType};
use domain::services::StoreError;
use sqlx::FromRow;

/// Column list shared by every statement returning sensor rows.
pub const SENSOR_COLUMNS: &str =
    "id, name, type, location, value, unit, status, last_updated, created_at";

/// Database row mapping for the sensors table.
#[derive(Debug, Clone, FromRow)]
pub struct SensorEntity {
    pub id: i32,
    pub name: String,
    #[sqlx(rename = "type")]
    pub sensor_type: String,
    pub location: String,
    pub value: Option<f64>,
    pub unit: String,
    pub status: String,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SensorEntity> for Sensor {
    type Error = StoreError;

    fn try_from(entity: SensorEntity) -> Result<Self, Self::Error> {
        let sensor_type = SensorType::parse(&entity.sensor_type).ok_or_else(|| {
            StoreError::Database(format!(
                "Sensor {} has unsupported type '{}'",
                entity.id, entity.sensor_type
            ))
        })?;

        Ok(Self {
            id: entity.id,
            name: entity.name,
            sensor_type,
            location: entity.location,
            value: entity.value,
            unit: entity.unit,
            status: entity.status,
            last_updated: entity.last_updated,
            created_at: entity.created_at,
            telemetry_status: None,
            telemetry_error: None,
        })
    }
}
