//! Standard response envelope.
//!
//! Every JSON body served under `/api/v1` has the shape
//! `{success, data, message, timestamp}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Default message for 201 responses.
pub const CREATED_MESSAGE: &str = "Resource created successfully";

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// True iff the status code is below 400.
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub timestamp: String,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    fn new(status: StatusCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            success: status.as_u16() < 400,
            data,
            message: message.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            status,
        }
    }

    /// 200 with a payload and an empty message.
    pub fn success(data: T) -> Self {
        Self::new(StatusCode::OK, Some(data), "")
    }

    /// 201 with the default creation message.
    pub fn created(data: T) -> Self {
        Self::new(StatusCode::CREATED, Some(data), CREATED_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl ApiResponse<()> {
    /// 200 with `data: null` and a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, None, message)
    }

    /// An error envelope with `data: null`.
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, None, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
