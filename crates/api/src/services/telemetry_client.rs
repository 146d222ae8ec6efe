//! HTTP client for the telemetry service.
//!
//! Consumes `GET /telemetry/{sensorId}` and
//! `GET /telemetry?type=temperature&location={loc}`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use domain::models::Telemetry;
use domain::services::{TelemetryError, TelemetrySource};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::config::TelemetryConfig;
use crate::middleware::metrics::record_telemetry_request;

/// Fallback text when the peer's error body carries no `error` field.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Reading as served by the telemetry peer.
#[derive(Debug, Deserialize)]
struct TelemetryPayload {
    #[serde(default)]
    sensor_id: Option<Value>,
    #[serde(default)]
    sensor_type: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

impl From<TelemetryPayload> for Telemetry {
    fn from(payload: TelemetryPayload) -> Self {
        let sensor_id = match payload.sensor_id {
            Some(Value::String(id)) => id,
            Some(Value::Number(id)) => id.to_string(),
            _ => String::new(),
        };

        Self {
            sensor_id,
            sensor_type: payload.sensor_type.unwrap_or_default(),
            unit: payload.unit.unwrap_or_default(),
            location: payload.location.unwrap_or_default(),
            value: payload.value,
            status: payload.status.unwrap_or_default(),
            timestamp: payload.timestamp.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<String>,
}

/// Telemetry service client backed by a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct TelemetryClient {
    client: Client,
    base_url: String,
}

impl TelemetryClient {
    /// Build a client with the configured base URL and per-request timeout.
    pub fn new(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| TelemetryError::RequestSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(
        &self,
        operation: &'static str,
        subject: &str,
        request: RequestBuilder,
    ) -> Result<Telemetry, TelemetryError> {
        info!(operation, subject, "Fetching telemetry");

        let result = match request.send().await {
            Ok(response) => read_reading(response).await,
            Err(e) => Err(transport_error(&e)),
        };

        match &result {
            Ok(_) => {
                record_telemetry_request(operation, "success");
                info!(operation, subject, "Telemetry received");
            }
            Err(e) => {
                record_telemetry_request(operation, "error");
                error!(operation, subject, error = %e, "Error fetching telemetry");
            }
        }

        result
    }
}

async fn read_reading(response: Response) -> Result<Telemetry, TelemetryError> {
    let status = response.status();
    // A body that stalls or breaks off is a transport failure, same as no response.
    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(&e))?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorPayload>(&body)
            .ok()
            .and_then(|payload| payload.error)
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        return Err(TelemetryError::Service(message));
    }

    serde_json::from_slice::<TelemetryPayload>(&body)
        .map(Telemetry::from)
        .map_err(|e| TelemetryError::Service(format!("invalid response body: {}", e)))
}

/// A request that was built but never fully answered counts as a connection
/// failure; anything rejected before sending is a setup error.
fn transport_error(err: &reqwest::Error) -> TelemetryError {
    if err.is_builder() {
        TelemetryError::RequestSetup(err.to_string())
    } else {
        TelemetryError::Connection
    }
}

#[async_trait::async_trait]
impl TelemetrySource for TelemetryClient {
    async fn fetch_by_sensor(&self, sensor_id: &str) -> Result<Telemetry, TelemetryError> {
        let url = format!("{}/telemetry/{}", self.base_url, sensor_id);
        let request = self.client.get(&url);
        self.fetch("by_sensor", sensor_id, request).await
    }

    async fn fetch_by_location(&self, location: &str) -> Result<Telemetry, TelemetryError> {
        let url = format!("{}/telemetry", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("type", "temperature"), ("location", location)]);
        self.fetch("by_location", location, request).await
    }
}
