//! Route definitions for the `/auth` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/send-verify-email", post(auth::send_verify_email))
        .route("/verify-email/{token}", get(auth::verify_email))
        .route("/send-reset-password/{id}", post(auth::send_reset_password))
        .route("/reset-password", put(auth::reset_password))
}
