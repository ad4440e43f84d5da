//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, users};
use crate::state::AppState;

/// Routes mounted at `/users`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/send-verify-email", post(auth::send_verify_email))
        .route("/me", get(users::me))
}
