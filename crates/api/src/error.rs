use authgate_core::error::CoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors. `BadRequest` carries request
/// bodies or path segments that failed to parse.
/// Implements [`IntoResponse`] to produce the standard envelope with
/// `success: false`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from the auth managers.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A request the extractors could not parse.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Status, machine code and client-safe message for this error.
    pub fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => {
                let (status, code) = match core {
                    CoreError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                    CoreError::InvalidCredentials => {
                        (StatusCode::BAD_REQUEST, "INVALID_CREDENTIALS")
                    }
                    CoreError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
                    CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
                    CoreError::Expired(_) => (StatusCode::GONE, "EXPIRED"),
                    CoreError::Internal(msg) => {
                        tracing::error!(error = %msg, "Internal core error");
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                    }
                };
                (status, code, core.public_message())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();

        let body = json!({
            "data": null,
            "message": message,
            "success": false,
            "status_code": status.as_u16(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
