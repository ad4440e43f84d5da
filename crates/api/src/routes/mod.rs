pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/login                       login (public)
/// /auth/logout                      logout (requires auth)
/// /auth/send-verify-email           send verification email (public)
/// /auth/verify-email/{token}        redeem verification token (public)
/// /auth/send-reset-password/{id}    send reset email (public)
/// /auth/reset-password              redeem reset token (public)
///
/// /users/register                   register (public)
/// /users/send-verify-email          send verification email (public)
/// /users/me                         current user (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
}
