//! Shared fixtures: managers wired to the in-memory collaborators.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use authgate_auth::backend::BackendError;
use authgate_auth::cache::{session_key, CachedSessionView};
use authgate_auth::memory::{
    MemorySessionCache, MemorySessionStore, MemoryUserDirectory, MemoryVerificationTokenStore,
};
use authgate_auth::ports::{MailDispatch, PasswordHasher, SessionCache, UserDirectory};
use authgate_auth::{
    Registration, RegistrationService, SessionLifecycleManager, TokenConfig, TokenSigner,
    VerificationTokenManager,
};
use authgate_core::types::DbId;
use authgate_db::models::user::{CreateUser, User, DEFAULT_ROLE};
use tokio::sync::Mutex;

pub fn token_config() -> TokenConfig {
    TokenConfig {
        access_secret: "test-access-secret".into(),
        refresh_secret: "test-refresh-secret".into(),
        verify_email_secret: "test-verify-email-secret".into(),
        reset_password_secret: "test-reset-password-secret".into(),
        access_token_expiry_mins: 15,
        refresh_token_expiry_days: 1,
        verification_token_expiry_mins: 15,
        issuer: "authgate-test".into(),
    }
}

/// Reversible stand-in for Argon2 so tests stay fast.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, BackendError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, BackendError> {
        match stored_hash.strip_prefix("plain$") {
            Some(expected) => Ok(expected == password),
            None => Err(BackendError::Hashing("unrecognised hash".into())),
        }
    }
}

/// Captures outbound mail instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub kind: &'static str,
    pub address: String,
    pub token: String,
}

impl RecordingMailer {
    pub async fn last(&self) -> Option<SentMail> {
        self.sent.lock().await.last().cloned()
    }

    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl MailDispatch for RecordingMailer {
    async fn send_verify_email(&self, address: &str, token: &str) -> Result<(), BackendError> {
        self.sent.lock().await.push(SentMail {
            kind: "verify_email",
            address: address.into(),
            token: token.into(),
        });
        Ok(())
    }

    async fn send_reset_password_email(
        &self,
        address: &str,
        token: &str,
    ) -> Result<(), BackendError> {
        self.sent.lock().await.push(SentMail {
            kind: "reset_password",
            address: address.into(),
            token: token.into(),
        });
        Ok(())
    }
}

/// A mail relay that refuses every message.
pub struct DownMailer;

#[async_trait]
impl MailDispatch for DownMailer {
    async fn send_verify_email(&self, _address: &str, _token: &str) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("smtp relay".into()))
    }

    async fn send_reset_password_email(
        &self,
        _address: &str,
        _token: &str,
    ) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("smtp relay".into()))
    }
}

/// A cache whose backend is down.
pub struct DownCache;

#[async_trait]
impl SessionCache for DownCache {
    async fn get(&self, _key: &str) -> Result<Option<CachedSessionView>, BackendError> {
        Err(BackendError::Unavailable("session cache".into()))
    }

    async fn set(
        &self,
        _key: &str,
        _view: &CachedSessionView,
        _ttl: Duration,
    ) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("session cache".into()))
    }

    async fn remove(&self, _key: &str) -> Result<bool, BackendError> {
        Err(BackendError::Unavailable("session cache".into()))
    }
}

/// A user directory that never answers lookups in time.
pub struct StalledUsers;

#[async_trait]
impl UserDirectory for StalledUsers {
    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, BackendError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, BackendError> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: DbId) -> Result<Option<User>, BackendError> {
        Ok(None)
    }

    async fn insert(&self, _input: &CreateUser) -> Result<User, BackendError> {
        Err(BackendError::Unavailable("user directory".into()))
    }

    async fn update_verified(&self, _id: DbId) -> Result<bool, BackendError> {
        Ok(false)
    }

    async fn update_password_hash(
        &self,
        _id: DbId,
        _password_hash: &str,
    ) -> Result<bool, BackendError> {
        Ok(false)
    }
}

/// Every manager wired to one shared set of in-memory collaborators.
pub struct Harness {
    pub users: Arc<MemoryUserDirectory>,
    pub sessions: Arc<MemorySessionStore>,
    pub cache: Arc<MemorySessionCache>,
    pub tokens: Arc<MemoryVerificationTokenStore>,
    pub mailer: Arc<RecordingMailer>,
    pub signer: Arc<TokenSigner>,
    pub lifecycle: SessionLifecycleManager,
    pub verification: VerificationTokenManager,
    pub registration: RegistrationService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_hasher(Arc::new(PlainHasher))
    }

    pub fn with_hasher(hasher: Arc<dyn PasswordHasher>) -> Self {
        let users = Arc::new(MemoryUserDirectory::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let cache = Arc::new(MemorySessionCache::new());
        let tokens = Arc::new(MemoryVerificationTokenStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let signer = Arc::new(TokenSigner::new(token_config()).unwrap());

        let lifecycle = SessionLifecycleManager::new(
            users.clone(),
            sessions.clone(),
            cache.clone(),
            hasher.clone(),
            signer.clone(),
        );
        let verification = VerificationTokenManager::new(
            users.clone(),
            tokens.clone(),
            hasher.clone(),
            signer.clone(),
            mailer.clone(),
        );
        let registration = RegistrationService::new(users.clone(), hasher);

        Self {
            users,
            sessions,
            cache,
            tokens,
            mailer,
            signer,
            lifecycle,
            verification,
            registration,
        }
    }

    /// Register `username` with `<username>@example.com`.
    pub async fn register(&self, username: &str, password: &str) -> User {
        let registered = self
            .registration
            .register(&Registration {
                username: username.into(),
                email: format!("{username}@example.com"),
                password: password.into(),
            })
            .await
            .unwrap();
        self.users
            .find_by_id(registered.id)
            .await
            .unwrap()
            .unwrap()
    }

    /// Insert a user directly, bypassing registration.
    pub async fn seed_user(&self, username: &str, password: &str) -> User {
        self.users
            .insert(&CreateUser {
                username: username.into(),
                email: format!("{username}@example.com"),
                password_hash: PlainHasher.hash(password).unwrap(),
                role: DEFAULT_ROLE.into(),
            })
            .await
            .unwrap()
    }

    pub async fn cached(&self, session_id: DbId) -> Option<CachedSessionView> {
        self.cache.get(&session_key(session_id)).await.unwrap()
    }

    /// Combined store and cache write count.
    pub fn writes(&self) -> usize {
        self.sessions.write_count() + self.cache.write_count()
    }
}
