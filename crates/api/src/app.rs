use std::any::Any;
use std::sync::Arc;

use axum::{
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Router,
};
use domain::services::SensorService;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{health, method_not_allowed, not_found, sensors};

#[derive(Clone)]
pub struct AppState {
    pub sensor_service: Arc<SensorService>,
    pub config: Arc<Config>,
}

pub fn create_app(config: Config, sensor_service: SensorService) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        sensor_service: Arc::new(sensor_service),
        config: config.clone(),
    };

    // Build CORS layer based on configuration
    let cors_layer = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods(cors::Any)
            .allow_headers(cors::Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(cors::Any)
            .allow_headers(cors::Any)
    };

    let sensor_routes = Router::new()
        .route(
            "/api/v1/sensors",
            get(sensors::list_sensors).post(sensors::create_sensor),
        )
        .route(
            "/api/v1/sensors/telemetry",
            get(sensors::telemetry_by_location),
        )
        .route(
            "/api/v1/sensors/:id",
            get(sensors::get_sensor)
                .put(sensors::update_sensor)
                .delete(sensors::delete_sensor),
        )
        .route(
            "/api/v1/sensors/:id/value",
            patch(sensors::update_sensor_value),
        );

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(sensor_routes)
        .fallback(not_found)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::map_response(method_not_allowed))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer)
        .with_state(state)
}

/// Renders a handler panic as a 500 envelope.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = detail, "Handler panicked");

    ApiError::Internal("Internal server error".to_string()).into_response()
}
