//! REST API module for HTTP endpoints
//!
//! - `POST /api/ingest` - Store one payload or an array of payloads
//! - `GET /api/metrics` - Current metrics snapshot
//! - `GET /api/data` - Stored data points after a timestamp, optionally by type

pub mod data;
pub mod ingest;
pub mod metrics;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "BAD_REQUEST".to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "BAD_REQUEST" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}
