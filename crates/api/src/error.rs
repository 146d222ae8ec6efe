use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::SensorError;
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                msg
            }
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg,
        };

        ApiResponse::failure(status, message).into_response()
    }
}

impl From<SensorError> for ApiError {
    fn from(err: SensorError) -> Self {
        match err {
            SensorError::Validation(_) | SensorError::BadRequest(_) => {
                ApiError::BadRequest(err.to_string())
            }
            SensorError::NotFound => ApiError::NotFound(err.to_string()),
            SensorError::Store(_) | SensorError::Telemetry(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}
