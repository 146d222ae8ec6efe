//! Sensor orchestration: CRUD through the store, live enrichment of
//! temperature sensors through the telemetry source.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info};

use crate::error::SensorError;
use crate::models::sensor::violations;
use crate::models::{
    LocationTelemetryResponse, Sensor, SensorCreate, SensorUpdate, SensorValueUpdate, Telemetry,
    TelemetryStatus,
};
use crate::services::{SensorStore, TelemetryError, TelemetrySource};

/// Coordinates the sensor store and the telemetry source.
///
/// Holds no state across requests; constructed once at startup and shared.
#[derive(Clone)]
pub struct SensorService {
    store: Arc<dyn SensorStore>,
    telemetry: Arc<dyn TelemetrySource>,
}

impl SensorService {
    pub fn new(store: Arc<dyn SensorStore>, telemetry: Arc<dyn TelemetrySource>) -> Self {
        Self { store, telemetry }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &dyn SensorStore {
        self.store.as_ref()
    }

    /// List all sensors, enriching temperature sensors with live readings.
    ///
    /// Readings are fetched concurrently and every outcome is awaited. A
    /// failed fetch marks only its own sensor with `telemetryStatus = error`;
    /// the list keeps the store's id order regardless of completion order.
    pub async fn list_sensors(&self) -> Result<Vec<Sensor>, SensorError> {
        let mut sensors = self.store.list().await.map_err(|e| {
            error!(error = %e, "Failed to list sensors");
            SensorError::from(e)
        })?;

        let fetches: Vec<_> = sensors
            .iter()
            .enumerate()
            .filter(|(_, sensor)| sensor.is_temperature())
            .map(|(index, sensor)| {
                let telemetry = Arc::clone(&self.telemetry);
                let sensor_id = sensor.id.to_string();
                async move {
                    let outcome = telemetry.fetch_by_sensor(&sensor_id).await;
                    (index, outcome)
                }
            })
            .collect();

        for (index, outcome) in join_all(fetches).await {
            merge_listed_reading(&mut sensors[index], outcome);
        }

        Ok(sensors)
    }

    /// Get a sensor by id, refreshing temperature sensors from telemetry.
    ///
    /// Unlike [`Self::list_sensors`], a failed fetch is only logged and the
    /// stored values are returned without a telemetry marker.
    pub async fn get_sensor(&self, id: i32) -> Result<Sensor, SensorError> {
        let mut sensor = self.store.get_by_id(id).await?;

        if sensor.is_temperature() {
            match self.telemetry.fetch_by_sensor(&id.to_string()).await {
                Ok(reading) => {
                    sensor.value = reading.value;
                    sensor.status = reading.status;
                    sensor.last_updated = reading.timestamp;
                    info!(sensor_id = id, "Updated temperature data from telemetry service");
                }
                Err(e) => {
                    error!(sensor_id = id, error = %e, "Failed to fetch temperature data");
                }
            }
        }

        Ok(sensor)
    }

    pub async fn create_sensor(&self, request: SensorCreate) -> Result<Sensor, SensorError> {
        if let Some(errors) = violations(&request) {
            return Err(SensorError::Validation(errors));
        }

        let sensor = self.store.create(&request).await?;
        info!(sensor_id = sensor.id, sensor_type = %sensor.sensor_type, "Sensor created");
        Ok(sensor)
    }

    /// Apply a partial update. Omitted fields keep their stored values.
    pub async fn update_sensor(
        &self,
        id: i32,
        request: SensorUpdate,
    ) -> Result<Sensor, SensorError> {
        if let Some(errors) = violations(&request) {
            return Err(SensorError::Validation(errors));
        }

        // The store reports NotFound itself; the explicit lookup keeps the
        // update statement from running against a missing row.
        self.store.get_by_id(id).await?;
        let sensor = self.store.update(id, &request).await?;
        info!(sensor_id = id, "Sensor updated");
        Ok(sensor)
    }

    pub async fn delete_sensor(&self, id: i32) -> Result<(), SensorError> {
        self.store.delete(id).await?;
        info!(sensor_id = id, "Sensor deleted");
        Ok(())
    }

    /// Record a new value and status reported for a sensor.
    pub async fn update_sensor_value(
        &self,
        id: i32,
        request: SensorValueUpdate,
    ) -> Result<(), SensorError> {
        let (value, status) = request.required_fields().ok_or_else(|| {
            SensorError::BadRequest("Value and status are required".to_string())
        })?;

        self.store.update_value(id, value, status).await?;
        info!(sensor_id = id, status = %status, "Sensor value updated");
        Ok(())
    }

    /// Proxy a telemetry lookup by location.
    ///
    /// Any telemetry failure propagates, including "not found" answers from
    /// the telemetry service.
    pub async fn telemetry_by_location(
        &self,
        location: &str,
    ) -> Result<LocationTelemetryResponse, SensorError> {
        if location.is_empty() {
            return Err(SensorError::BadRequest("Location is required".to_string()));
        }

        let reading = self.telemetry.fetch_by_location(location).await?;
        Ok(reading.into())
    }
}

fn merge_listed_reading(sensor: &mut Sensor, outcome: Result<Telemetry, TelemetryError>) {
    match outcome {
        Ok(reading) => {
            sensor.value = reading.value;
            sensor.last_updated = reading.timestamp;
            sensor.telemetry_status = Some(TelemetryStatus::Updated);
            info!(sensor_id = sensor.id, "Updated temperature data from telemetry service");
        }
        Err(e) => {
            error!(sensor_id = sensor.id, error = %e, "Failed to fetch telemetry for sensor");
            sensor.telemetry_status = Some(TelemetryStatus::Error);
            sensor.telemetry_error = Some(e.to_string());
        }
    }
}
