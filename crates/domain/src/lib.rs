//! Domain layer for the sensor service.
//!
//! This crate contains:
//! - Domain models (Sensor, Telemetry) and their validators
//! - The store and telemetry abstractions
//! - The enrichment service
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::SensorError;
