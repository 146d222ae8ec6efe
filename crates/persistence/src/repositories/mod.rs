//! Repository implementations for database operations.

pub mod sensor;

pub use sensor::SensorRepository;
