//! Domain services for the sensor service.
//!
//! The store and telemetry traits are the seams to the outside world;
//! [`SensorService`] orchestrates them.

pub mod sensor_service;
pub mod sensor_store;
pub mod telemetry;

pub use sensor_service::SensorService;
pub use sensor_store::{InMemorySensorStore, SensorStore, StoreError};
pub use telemetry::{MockTelemetrySource, TelemetryError, TelemetrySource};
