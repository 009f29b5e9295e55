//! # REST API Interface Layer
//!
//! HTTP endpoints for trackers, mounted under `/api` by [`crate::create_router`].
//!
//! Every failing endpoint answers with an [`ErrorResponse`] body carrying a
//! human-readable `message` and a stable `code`.

pub mod mappers;
pub mod tracker_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorResponse;

/// Build a JSON error response
pub fn error_response(status: StatusCode, message: impl Into<String>, code: &str) -> Response {
    let body = ErrorResponse {
        message: message.into(),
        code: code.to_string(),
    };
    (status, Json(body)).into_response()
}
