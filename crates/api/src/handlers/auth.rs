//! Handlers for the `/auth` resource.

use authgate_auth::{PasswordReset, SessionHandle};
use authgate_core::types::DbId;
use axum::extract::State;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::middleware::auth::AuthUser;
use crate::response::ServiceResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/logout`.
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub session_id: DbId,
}

/// Request body for the send-verify-email endpoints.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<ServiceResponse<SessionHandle>> {
    let handle = state.lifecycle.login(&input.username, &input.password).await?;
    Ok(ServiceResponse::ok(handle, "Login successful"))
}

/// POST /api/auth/logout
///
/// Revoke one of the caller's sessions.
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<LogoutRequest>,
) -> AppResult<ServiceResponse<()>> {
    state
        .lifecycle
        .logout(auth_user.user_id, input.session_id)
        .await?;
    Ok(ServiceResponse::message("Logged out"))
}

/// POST /api/auth/send-verify-email (also mounted under `/api/users`)
pub async fn send_verify_email(
    State(state): State<AppState>,
    Json(input): Json<EmailRequest>,
) -> AppResult<ServiceResponse<()>> {
    state.verification.send_verify_email(&input.email).await?;
    Ok(ServiceResponse::message("Verification email sent"))
}

/// GET /api/auth/verify-email/{token}
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<ServiceResponse<()>> {
    state.verification.verify_email(&token).await?;
    Ok(ServiceResponse::message("Email verified"))
}

/// POST /api/auth/send-reset-password/{id}
pub async fn send_reset_password(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<ServiceResponse<()>> {
    state.verification.send_reset_password(user_id).await?;
    Ok(ServiceResponse::message("Password reset email sent"))
}

/// PUT /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<PasswordReset>,
) -> AppResult<ServiceResponse<()>> {
    state.verification.reset_password(&input).await?;
    Ok(ServiceResponse::message("Password has been reset"))
}
