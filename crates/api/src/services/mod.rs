//! Outbound service clients.

pub mod telemetry_client;

pub use telemetry_client::TelemetryClient;
