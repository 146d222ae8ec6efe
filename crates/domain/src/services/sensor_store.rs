//! Sensor persistence abstraction.

use std::collections::BTreeMap;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::sensor::DEFAULT_SENSOR_STATUS;
use crate::models::{Sensor, SensorChange, SensorCreate, SensorType, SensorUpdate};

/// Errors reported by a sensor store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No row matched the requested id.
    #[error("Sensor not found")]
    NotFound,

    /// Any other storage failure, carrying the driver message.
    #[error("{0}")]
    Database(String),
}

/// CRUD operations on the sensors table.
///
/// Every operation is a single autonomous statement; no transactions span
/// calls.
#[async_trait::async_trait]
pub trait SensorStore: Send + Sync {
    /// Connectivity probe.
    async fn ping(&self) -> Result<(), StoreError>;

    /// All sensors ordered by id ascending.
    async fn list(&self) -> Result<Vec<Sensor>, StoreError>;

    async fn get_by_id(&self, id: i32) -> Result<Sensor, StoreError>;

    /// Insert a validated sensor with status `inactive` and no value.
    async fn create(&self, sensor: &SensorCreate) -> Result<Sensor, StoreError>;

    /// Apply only the supplied fields and refresh `last_updated`.
    async fn update(&self, id: i32, update: &SensorUpdate) -> Result<Sensor, StoreError>;

    /// Set value, status and `last_updated` unconditionally.
    async fn update_value(&self, id: i32, value: Option<f64>, status: &str)
        -> Result<(), StoreError>;

    async fn delete(&self, id: i32) -> Result<(), StoreError>;
}

/// In-memory sensor store for development and testing.
#[derive(Debug, Default)]
pub struct InMemorySensorStore {
    state: RwLock<InMemoryState>,
    failure: Option<String>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    next_id: i32,
    sensors: BTreeMap<i32, Sensor>,
}

impl InMemorySensorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every operation fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            state: RwLock::default(),
            failure: Some(message.into()),
        }
    }

    /// Create a store pre-populated with sensors, keyed by their ids.
    pub fn with_sensors(sensors: impl IntoIterator<Item = Sensor>) -> Self {
        let sensors: BTreeMap<i32, Sensor> = sensors.into_iter().map(|s| (s.id, s)).collect();
        let next_id = sensors.keys().next_back().copied().unwrap_or(0);
        Self {
            state: RwLock::new(InMemoryState { next_id, sensors }),
            failure: None,
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        match &self.failure {
            Some(message) => Err(StoreError::Database(message.clone())),
            None => Ok(()),
        }
    }
}

fn parse_type(raw: &str) -> Result<SensorType, StoreError> {
    SensorType::parse(raw)
        .ok_or_else(|| StoreError::Database(format!("unsupported sensor type '{}'", raw)))
}

#[async_trait::async_trait]
impl SensorStore for InMemorySensorStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }

    async fn list(&self) -> Result<Vec<Sensor>, StoreError> {
        self.check()?;
        Ok(self.state.read().await.sensors.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Sensor, StoreError> {
        self.check()?;
        self.state
            .read()
            .await
            .sensors
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, sensor: &SensorCreate) -> Result<Sensor, StoreError> {
        self.check()?;
        let sensor_type = parse_type(&sensor.sensor_type)?;
        let now = Utc::now();

        let mut state = self.state.write().await;
        state.next_id += 1;
        let created = Sensor {
            id: state.next_id,
            name: sensor.name.clone(),
            sensor_type,
            location: sensor.location.clone(),
            value: None,
            unit: sensor.unit.clone(),
            status: DEFAULT_SENSOR_STATUS.to_string(),
            last_updated: now,
            created_at: now,
            telemetry_status: None,
            telemetry_error: None,
        };
        state.sensors.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, update: &SensorUpdate) -> Result<Sensor, StoreError> {
        self.check()?;
        let mut state = self.state.write().await;
        let sensor = state.sensors.get_mut(&id).ok_or(StoreError::NotFound)?;

        for change in update.changes() {
            match change {
                SensorChange::Name(name) => sensor.name = name.to_string(),
                SensorChange::Type(raw) => sensor.sensor_type = parse_type(raw)?,
                SensorChange::Location(location) => sensor.location = location.to_string(),
                SensorChange::Value(value) => sensor.value = value,
                SensorChange::Unit(unit) => sensor.unit = unit.to_string(),
                SensorChange::Status(status) => sensor.status = status.to_string(),
            }
        }
        sensor.last_updated = Utc::now();
        Ok(sensor.clone())
    }

    async fn update_value(
        &self,
        id: i32,
        value: Option<f64>,
        status: &str,
    ) -> Result<(), StoreError> {
        self.check()?;
        let mut state = self.state.write().await;
        let sensor = state.sensors.get_mut(&id).ok_or(StoreError::NotFound)?;
        sensor.value = value;
        sensor.status = status.to_string();
        sensor.last_updated = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        self.check()?;
        self.state
            .write()
            .await
            .sensors
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
