#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use authgate_api::config::ServerConfig;
use authgate_api::router::build_app_router;
use authgate_api::state::{AppState, Collaborators};
use authgate_auth::backend::BackendError;
use authgate_auth::memory::{
    MemorySessionCache, MemorySessionStore, MemoryUserDirectory, MemoryVerificationTokenStore,
};
use authgate_auth::ports::{MailDispatch, PasswordHasher};
use authgate_auth::{TokenConfig, TokenSigner};
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::Mutex;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        login_timeout_secs: 5,
        session_cleanup_interval_secs: 3600,
        session_retention_days: 30,
        database_url: "postgres://unused".to_string(),
        redis_url: None,
        tokens: TokenConfig {
            access_secret: "api-test-access".into(),
            refresh_secret: "api-test-refresh".into(),
            verify_email_secret: "api-test-verify".into(),
            reset_password_secret: "api-test-reset".into(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 1,
            verification_token_expiry_mins: 15,
            issuer: "authgate-test".into(),
        },
        email: None,
    }
}

/// Fast reversible hasher for HTTP tests.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, BackendError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, BackendError> {
        Ok(stored_hash.strip_prefix("plain$") == Some(password))
    }
}

/// Keeps the last token mailed so tests can redeem it.
#[derive(Default)]
pub struct Outbox {
    pub tokens: Mutex<Vec<(String, String)>>,
}

impl Outbox {
    pub async fn last_token(&self) -> Option<String> {
        self.tokens.lock().await.last().map(|(_, t)| t.clone())
    }
}

#[async_trait]
impl MailDispatch for Outbox {
    async fn send_verify_email(&self, address: &str, token: &str) -> Result<(), BackendError> {
        self.tokens.lock().await.push((address.into(), token.into()));
        Ok(())
    }

    async fn send_reset_password_email(
        &self,
        address: &str,
        token: &str,
    ) -> Result<(), BackendError> {
        self.tokens.lock().await.push((address.into(), token.into()));
        Ok(())
    }
}

/// Application plus handles on its in-memory collaborators.
pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserDirectory>,
    pub sessions: Arc<MemorySessionStore>,
    pub cache: Arc<MemorySessionCache>,
    pub tokens: Arc<MemoryVerificationTokenStore>,
    pub outbox: Arc<Outbox>,
    pub signer: Arc<TokenSigner>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full router, middleware included, over in-memory stores.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let users = Arc::new(MemoryUserDirectory::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let tokens = Arc::new(MemoryVerificationTokenStore::new());
    let cache = Arc::new(MemorySessionCache::new());
    let outbox = Arc::new(Outbox::default());
    let signer = Arc::new(TokenSigner::new(config.tokens.clone()).unwrap());

    let deps = Collaborators {
        users: users.clone(),
        sessions: sessions.clone(),
        tokens: tokens.clone(),
        cache: cache.clone(),
        hasher: Arc::new(PlainHasher),
        mailer: outbox.clone(),
    };
    let state = AppState::new(config, signer.clone(), deps, None);

    TestApp {
        router: build_app_router(state),
        users,
        sessions,
        cache,
        tokens,
        outbox,
        signer,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    bearer: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
