//! Domain models for the sensor service.

pub mod sensor;
pub mod telemetry;

pub use sensor::{
    Sensor, SensorChange, SensorCreate, SensorType, SensorUpdate, SensorValueUpdate,
    TelemetryStatus,
};
pub use telemetry::{LocationTelemetryResponse, Telemetry};
