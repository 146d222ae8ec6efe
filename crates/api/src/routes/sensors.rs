//! Sensor endpoint handlers.

use axum::extract::{Path, State};
use domain::models::sensor::parse_sensor_id;
use domain::models::{
    LocationTelemetryResponse, Sensor, SensorCreate, SensorUpdate, SensorValueUpdate,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiQuery};
use crate::response::ApiResponse;

/// Query parameters for the telemetry lookup.
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    pub location: Option<String>,
}

fn sensor_id(raw: &str) -> Result<i32, ApiError> {
    parse_sensor_id(raw).ok_or_else(|| ApiError::BadRequest("Invalid sensor ID".to_string()))
}

/// Removes one pair of surrounding double quotes, if present.
pub fn strip_quotes(location: &str) -> &str {
    location
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(location)
}

/// List all sensors with live temperature readings.
///
/// GET /api/v1/sensors
pub async fn list_sensors(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Sensor>>, ApiError> {
    let sensors = state.sensor_service.list_sensors().await?;
    Ok(ApiResponse::success(sensors))
}

/// GET /api/v1/sensors/:id
pub async fn get_sensor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Sensor>, ApiError> {
    let sensor = state.sensor_service.get_sensor(sensor_id(&id)?).await?;
    Ok(ApiResponse::success(sensor))
}

/// POST /api/v1/sensors
pub async fn create_sensor(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SensorCreate>,
) -> Result<ApiResponse<Sensor>, ApiError> {
    let sensor = state.sensor_service.create_sensor(request).await?;
    Ok(ApiResponse::created(sensor))
}

/// PUT /api/v1/sensors/:id
pub async fn update_sensor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<SensorUpdate>,
) -> Result<ApiResponse<Sensor>, ApiError> {
    let id = sensor_id(&id)?;
    let sensor = state.sensor_service.update_sensor(id, request).await?;
    Ok(ApiResponse::success(sensor))
}

/// DELETE /api/v1/sensors/:id
pub async fn delete_sensor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    state.sensor_service.delete_sensor(sensor_id(&id)?).await?;
    Ok(ApiResponse::message("Sensor deleted successfully"))
}

/// PATCH /api/v1/sensors/:id/value
pub async fn update_sensor_value(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<SensorValueUpdate>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = sensor_id(&id)?;
    state.sensor_service.update_sensor_value(id, request).await?;
    Ok(ApiResponse::message("Sensor value updated successfully"))
}

/// Proxy a telemetry lookup by location.
///
/// GET /api/v1/sensors/telemetry?location=<loc>
pub async fn telemetry_by_location(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TelemetryQuery>,
) -> Result<ApiResponse<LocationTelemetryResponse>, ApiError> {
    let location = query
        .location
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Location query parameter is required".to_string()))?;

    let reading = state
        .sensor_service
        .telemetry_by_location(strip_quotes(&location))
        .await?;
    Ok(ApiResponse::success(reading))
}
