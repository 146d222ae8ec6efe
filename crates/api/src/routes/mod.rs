//! HTTP route handlers.

pub mod health;
pub mod sensors;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::response::ApiResponse;

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Resource not found".to_string())
}

/// Wraps axum's bare 405 in the standard envelope, keeping the `Allow` header.
pub async fn method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut enveloped =
        ApiResponse::failure(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(header::ALLOW, allow);
    }
    enveloped
}
