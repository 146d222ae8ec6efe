//! Integration tests for the sensor endpoints.
//!
//! The full router (middleware, extractors, fallback) is exercised with an
//! in-memory store and a scripted telemetry source.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, empty_request, json_request, parse_response_body, reading, stored_sensor,
    test_config,
};
use domain::models::SensorType;
use domain::services::{InMemorySensorStore, MockTelemetrySource, SensorService, TelemetryError};
use sensor_service_api::app::create_app;
use serde_json::json;
use tower::ServiceExt;

fn assert_envelope(body: &serde_json::Value, success: bool) {
    assert_eq!(body["success"], success);
    assert!(body["message"].is_string());
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

// ============================================================================
// Health & infrastructure
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app.oneshot(empty_request(Method::GET, "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_readiness_reflects_store() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());
    let response = app
        .oneshot(empty_request(Method::GET, "/health/ready"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await, json!({"status": "ready"}));

    let app = create_test_app(
        InMemorySensorStore::failing("connection refused"),
        MockTelemetrySource::new(),
    );
    let response = app
        .oneshot(empty_request(Method::GET, "/health/ready"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        parse_response_body(response).await,
        json!({"status": "unavailable"})
    );
}

#[tokio::test]
async fn test_unknown_route_is_enveloped_404() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .oneshot(empty_request(Method::GET, "/api/v1/unknown"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = parse_response_body(response).await;
    assert_envelope(&body, false);
    assert_eq!(body["message"], "Resource not found");
    assert_eq!(body["data"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_unsupported_method_is_enveloped_405() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .oneshot(empty_request(Method::DELETE, "/api/v1/sensors"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.headers().contains_key("allow"));
    let body = parse_response_body(response).await;
    assert_envelope(&body, false);
    assert_eq!(body["message"], "Method not allowed");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());
    let request = axum::http::Request::builder()
        .uri("/health")
        .header("X-Request-ID", "req-42")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    sensor_service_api::middleware::init_metrics().unwrap();
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app.oneshot(empty_request(Method::GET, "/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Listing & enrichment
// ============================================================================

#[tokio::test]
async fn test_list_sensors_enriches_temperature_sensors() {
    let store = InMemorySensorStore::with_sensors([
        stored_sensor(1, SensorType::Temperature, Some(18.0)),
        stored_sensor(2, SensorType::Temperature, Some(19.0)),
        stored_sensor(3, SensorType::Humidity, Some(45.0)),
    ]);
    let telemetry = Arc::new(
        MockTelemetrySource::new()
            .with_sensor("1", Ok(reading("1", "Lab A", 22.5)))
            .with_sensor("2", Err(TelemetryError::Connection)),
    );
    let service = SensorService::new(Arc::new(store), telemetry.clone());
    let app = create_app(test_config(), service);

    let response = app
        .oneshot(empty_request(Method::GET, "/api/v1/sensors"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_envelope(&body, true);

    let sensors = body["data"].as_array().unwrap();
    assert_eq!(sensors.len(), 3);

    assert_eq!(sensors[0]["id"], 1);
    assert_eq!(sensors[0]["value"], 22.5);
    assert_eq!(sensors[0]["telemetryStatus"], "updated");
    assert_eq!(sensors[0]["lastUpdated"], "2024-06-01T12:00:00Z");

    assert_eq!(sensors[1]["id"], 2);
    assert_eq!(sensors[1]["value"], 19.0);
    assert_eq!(sensors[1]["telemetryStatus"], "error");
    assert_eq!(
        sensors[1]["telemetryError"],
        "Could not connect to telemetry service"
    );

    assert_eq!(sensors[2]["type"], "humidity");
    assert_eq!(sensors[2]["value"], 45.0);
    assert!(sensors[2].get("telemetryStatus").is_none());

    let mut calls = telemetry.calls();
    calls.sort();
    assert_eq!(calls, vec!["sensor:1", "sensor:2"]);
}

#[tokio::test]
async fn test_list_sensors_store_failure() {
    let app = create_test_app(
        InMemorySensorStore::failing("Failed to get sensors: connection refused"),
        MockTelemetrySource::new(),
    );

    let response = app
        .oneshot(empty_request(Method::GET, "/api/v1/sensors"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert_envelope(&body, false);
    assert_eq!(body["message"], "Failed to get sensors: connection refused");
}

// ============================================================================
// Get by id
// ============================================================================

#[tokio::test]
async fn test_get_sensor_refreshes_temperature_reading() {
    let store =
        InMemorySensorStore::with_sensors([stored_sensor(4, SensorType::Temperature, Some(1.0))]);
    let telemetry = MockTelemetrySource::new().with_sensor("4", Ok(reading("4", "Lab A", 23.0)));
    let app = create_test_app(store, telemetry);

    let response = app
        .oneshot(empty_request(Method::GET, "/api/v1/sensors/4"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["data"]["value"], 23.0);
    assert_eq!(body["data"]["status"], "online");
    assert!(body["data"].get("telemetryStatus").is_none());
}

#[tokio::test]
async fn test_get_sensor_invalid_id() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .oneshot(empty_request(Method::GET, "/api/v1/sensors/abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_envelope(&body, false);
    assert_eq!(body["message"], "Invalid sensor ID");
}

#[tokio::test]
async fn test_get_sensor_not_found() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .oneshot(empty_request(Method::GET, "/api/v1/sensors/999"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Sensor not found");
    assert_eq!(body["data"], serde_json::Value::Null);
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_sensor() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/sensors",
            json!({"name": "Kitchen", "type": "temperature", "location": "Kitchen", "unit": "°C"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_envelope(&body, true);
    assert_eq!(body["message"], "Resource created successfully");
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["type"], "temperature");
    assert_eq!(body["data"]["status"], "inactive");
    assert_eq!(body["data"]["value"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_create_sensor_lists_every_missing_field() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .oneshot(json_request(Method::POST, "/api/v1/sensors", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(
        body["message"],
        "Name is required, Type is required, Location is required, Unit is required"
    );
}

#[tokio::test]
async fn test_create_sensor_null_fields_count_as_missing() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/sensors",
            json!({"name": null, "type": null, "location": null, "unit": null}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_envelope(&body, false);
    assert_eq!(
        body["message"],
        "Name is required, Type is required, Location is required, Unit is required"
    );
}

#[tokio::test]
async fn test_create_sensor_unsupported_type() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/sensors",
            json!({"name": "Yard", "type": "sonar", "location": "Yard", "unit": "m"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    let message = body["message"].as_str().unwrap();
    for sensor_type in [
        "temperature",
        "humidity",
        "light",
        "motion",
        "air_quality",
        "pressure",
    ] {
        assert!(message.contains(sensor_type), "missing {}", sensor_type);
    }
}

#[tokio::test]
async fn test_create_sensor_malformed_json() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/v1/sensors")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"name\":"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_envelope(&parse_response_body(response).await, false);
}

// ============================================================================
// Update & delete
// ============================================================================

#[tokio::test]
async fn test_empty_update_only_changes_last_updated() {
    let store = InMemorySensorStore::with_sensors([stored_sensor(5, SensorType::Light, Some(300.0))]);
    let app = create_test_app(store, MockTelemetrySource::new());

    let response = app
        .oneshot(json_request(Method::PUT, "/api/v1/sensors/5", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let mut body = parse_response_body(response).await;
    let mut data = body["data"].take();
    assert_ne!(data["lastUpdated"], "2024-01-01T00:00:00Z");

    let mut expected = serde_json::to_value(stored_sensor(5, SensorType::Light, Some(300.0))).unwrap();
    data.as_object_mut().unwrap().remove("lastUpdated");
    expected.as_object_mut().unwrap().remove("lastUpdated");
    assert_eq!(data, expected);
}

#[tokio::test]
async fn test_update_applies_supplied_fields() {
    let store = InMemorySensorStore::with_sensors([stored_sensor(5, SensorType::Light, Some(300.0))]);
    let app = create_test_app(store, MockTelemetrySource::new());

    let response = app
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/sensors/5",
            json!({"name": "", "unit": "lux", "value": null}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["data"]["name"], "Sensor 5");
    assert_eq!(body["data"]["unit"], "lux");
    assert_eq!(body["data"]["value"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_update_missing_sensor() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/sensors/77",
            json!({"name": "Ghost"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        parse_response_body(response).await["message"],
        "Sensor not found"
    );
}

#[tokio::test]
async fn test_delete_sensor() {
    let store = InMemorySensorStore::with_sensors([stored_sensor(6, SensorType::Motion, None)]);
    let app = create_test_app(store, MockTelemetrySource::new());

    let response = app
        .clone()
        .oneshot(empty_request(Method::DELETE, "/api/v1/sensors/6"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_envelope(&body, true);
    assert_eq!(body["message"], "Sensor deleted successfully");
    assert_eq!(body["data"], serde_json::Value::Null);

    let response = app
        .oneshot(empty_request(Method::DELETE, "/api/v1/sensors/6"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Value update
// ============================================================================

#[tokio::test]
async fn test_update_value_accepts_zero() {
    let store = InMemorySensorStore::with_sensors([stored_sensor(8, SensorType::Pressure, Some(1013.0))]);
    let app = create_test_app(store, MockTelemetrySource::new());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            "/api/v1/sensors/8/value",
            json!({"value": 0, "status": "active"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_response_body(response).await["message"],
        "Sensor value updated successfully"
    );

    let response = app
        .oneshot(empty_request(Method::GET, "/api/v1/sensors/8"))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["data"]["value"], 0.0);
    assert_eq!(body["data"]["status"], "active");
}

#[tokio::test]
async fn test_update_value_requires_value_and_status() {
    let store = InMemorySensorStore::with_sensors([stored_sensor(8, SensorType::Pressure, None)]);
    let app = create_test_app(store, MockTelemetrySource::new());

    for payload in [json!({"value": 3.5}), json!({"status": "active"})] {
        let response = app
            .clone()
            .oneshot(json_request(Method::PATCH, "/api/v1/sensors/8/value", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_response_body(response).await["message"],
            "Value and status are required"
        );
    }
}

#[tokio::test]
async fn test_update_value_missing_sensor() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .oneshot(json_request(
            Method::PATCH,
            "/api/v1/sensors/3/value",
            json!({"value": 1, "status": "active"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Telemetry by location
// ============================================================================

#[tokio::test]
async fn test_telemetry_by_location_strips_quotes() {
    let telemetry = Arc::new(
        MockTelemetrySource::new().with_location("Lab A", Ok(reading("12", "Lab A", 20.5))),
    );
    let service = SensorService::new(Arc::new(InMemorySensorStore::new()), telemetry.clone());
    let app = create_app(test_config(), service);

    for uri in [
        "/api/v1/sensors/telemetry?location=Lab%20A",
        "/api/v1/sensors/telemetry?location=%22Lab%20A%22",
    ] {
        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = parse_response_body(response).await;
        assert_envelope(&body, true);
        assert_eq!(body["data"]["location"], "Lab A");
        assert_eq!(body["data"]["value"], 20.5);
        assert_eq!(body["data"]["type"], "temperature");
        assert_eq!(body["data"]["sensorId"], "12");
    }

    assert_eq!(telemetry.calls(), vec!["location:Lab A", "location:Lab A"]);
}

#[tokio::test]
async fn test_telemetry_by_location_requires_parameter() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/api/v1/sensors/telemetry"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        parse_response_body(response).await["message"],
        "Location query parameter is required"
    );

    let response = app
        .oneshot(empty_request(
            Method::GET,
            "/api/v1/sensors/telemetry?location=%22%22",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        parse_response_body(response).await["message"],
        "Location is required"
    );
}

#[tokio::test]
async fn test_telemetry_by_location_malformed_query_is_enveloped() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .oneshot(empty_request(
            Method::GET,
            "/api/v1/sensors/telemetry?location=Attic&location=Cellar",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_envelope(&parse_response_body(response).await, false);
}

#[tokio::test]
async fn test_telemetry_by_location_failure_is_500() {
    let app = create_test_app(InMemorySensorStore::new(), MockTelemetrySource::new());

    let response = app
        .oneshot(empty_request(
            Method::GET,
            "/api/v1/sensors/telemetry?location=Attic",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert_envelope(&body, false);
    assert_eq!(body["message"], "Telemetry service error: Unknown error");
}
