//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod sensor;

pub use sensor::SensorEntity;
