//! Response envelope shared by every endpoint.
//!
//! Success and failure bodies have the same shape:
//! `{ "data": ..., "message": ..., "success": ..., "status_code": ... }`.
//! Failures (see [`crate::error::AppError`]) add a machine-readable `code`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ServiceResponse<T: Serialize> {
    pub data: T,
    pub message: String,
    pub success: bool,
    pub status_code: u16,
}

impl<T: Serialize> ServiceResponse<T> {
    /// `200 OK` with a payload.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, data, message)
    }

    /// `201 Created` with a payload.
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, data, message)
    }

    fn with_status(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
            status_code: status.as_u16(),
        }
    }
}

impl ServiceResponse<()> {
    /// `200 OK` with `data: null`.
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok((), message)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
