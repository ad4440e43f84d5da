use std::sync::Arc;
use std::time::Duration;

use authgate_auth::ports::{
    MailDispatch, PasswordHasher, SessionCache, SessionStore, UserDirectory,
    VerificationTokenStore,
};
use authgate_auth::{
    RegistrationService, SessionLifecycleManager, TokenSigner, VerificationTokenManager,
};

use crate::config::ServerConfig;

/// The collaborators every manager is built from.
pub struct Collaborators {
    pub users: Arc<dyn UserDirectory>,
    pub sessions: Arc<dyn SessionStore>,
    pub tokens: Arc<dyn VerificationTokenStore>,
    pub cache: Arc<dyn SessionCache>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub mailer: Arc<dyn MailDispatch>,
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (everything is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database pool, used by the health check. `None` when the stores are
    /// not Postgres-backed.
    pub pool: Option<authgate_db::DbPool>,
    pub config: Arc<ServerConfig>,
    pub signer: Arc<TokenSigner>,
    pub users: Arc<dyn UserDirectory>,
    pub lifecycle: Arc<SessionLifecycleManager>,
    pub verification: Arc<VerificationTokenManager>,
    pub registration: Arc<RegistrationService>,
}

impl AppState {
    /// Wire the managers from their collaborators.
    pub fn new(
        config: ServerConfig,
        signer: Arc<TokenSigner>,
        deps: Collaborators,
        pool: Option<authgate_db::DbPool>,
    ) -> Self {
        let lifecycle = SessionLifecycleManager::new(
            Arc::clone(&deps.users),
            deps.sessions,
            deps.cache,
            Arc::clone(&deps.hasher),
            Arc::clone(&signer),
        )
        .with_timeout(Duration::from_secs(config.login_timeout_secs));

        let verification = VerificationTokenManager::new(
            Arc::clone(&deps.users),
            deps.tokens,
            Arc::clone(&deps.hasher),
            Arc::clone(&signer),
            deps.mailer,
        );

        let registration = RegistrationService::new(Arc::clone(&deps.users), deps.hasher);

        Self {
            pool,
            config: Arc::new(config),
            signer,
            users: deps.users,
            lifecycle: Arc::new(lifecycle),
            verification: Arc::new(verification),
            registration: Arc::new(registration),
        }
    }
}
