//! Handlers for the `/users` resource.

use authgate_auth::{RegisteredUser, Registration};
use authgate_core::error::CoreError;
use authgate_db::models::user::UserResponse;
use axum::extract::State;

use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::middleware::auth::AuthUser;
use crate::response::ServiceResponse;
use crate::state::AppState;

/// POST /api/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<Registration>,
) -> AppResult<ServiceResponse<RegisteredUser>> {
    let user = state.registration.register(&input).await?;
    Ok(ServiceResponse::created(user, "User registered"))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<ServiceResponse<UserResponse>> {
    let user = state
        .users
        .find_by_id(auth_user.user_id)
        .await
        .map_err(CoreError::from)?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User" }))?;
    Ok(ServiceResponse::ok(UserResponse::from(user), "Current user"))
}
