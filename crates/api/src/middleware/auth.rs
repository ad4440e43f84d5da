//! Bearer access-token extractor for Axum handlers.

use authgate_auth::TokenPurpose;
use authgate_core::error::CoreError;
use authgate_core::types::DbId;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller, extracted from `Authorization: Bearer <access token>`.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's id, from the token subject.
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let user_id = state
            .signer
            .validate(TokenPurpose::Access, token)
            .and_then(|sub| sub.parse::<DbId>().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
            })?;

        Ok(AuthUser { user_id })
    }
}
