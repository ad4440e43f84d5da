//! Application router and its middleware stack.
//!
//! `main` and the integration tests both build the service through
//! [`build_app_router`], so every test request passes through the same
//! layers as production traffic.

use std::any::Any;
use std::time::Duration;

use authgate_core::error::CoreError;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Build the `/health` and `/api` routes wrapped in the middleware stack.
///
/// Layers, outermost first: CORS, request-id assignment, tracing,
/// request-id echo, request timeout, panic recovery.
pub fn build_app_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_routes())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Span carrying the method, path and assigned request id.
fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id,
    )
}

/// A panicking handler still answers with the error envelope.
fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked");
    AppError::Core(CoreError::Internal("handler panicked".into())).into_response()
}

/// CORS for the configured browser origins.
///
/// Panics at startup if an origin is not a valid header value.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins = config.cors_origins.iter().map(|origin| {
        HeaderValue::from_str(origin)
            .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
    });

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn panic_is_rendered_as_internal_envelope() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["message"], "An internal error occurred");
    }
}
