//! Collaborator contracts consumed by the managers.
//!
//! Each trait is object-safe and `Send + Sync` so managers can hold them as
//! `Arc<dyn Trait>`; production adapters live in [`crate::store`],
//! [`crate::cache`] and [`crate::mailer`], in-process ones in
//! [`crate::memory`].

use std::time::Duration;

use async_trait::async_trait;
use authgate_core::types::DbId;
use authgate_db::models::session::{CreateSession, Session};
use authgate_db::models::user::{CreateUser, User};
use authgate_db::models::verification_token::{
    CreateVerificationToken, VerificationPurpose, VerificationToken,
};

use crate::backend::BackendError;
use crate::cache::CachedSessionView;

/// Lookup and mutation of user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, BackendError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, BackendError>;
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, BackendError>;

    /// Insert a user. Duplicate username/email must surface as
    /// [`BackendError::Duplicate`].
    async fn insert(&self, input: &CreateUser) -> Result<User, BackendError>;

    async fn update_verified(&self, id: DbId) -> Result<bool, BackendError>;
    async fn update_password_hash(&self, id: DbId, password_hash: &str)
        -> Result<bool, BackendError>;
}

/// The durable, authoritative record of login sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, input: &CreateSession) -> Result<Session, BackendError>;

    /// The user's newest non-revoked session, expired or not.
    async fn find_by_user_id(&self, user_id: DbId) -> Result<Option<Session>, BackendError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Session>, BackendError>;

    /// Mark a session revoked. Returns `false` if it was already revoked or absent.
    async fn revoke_by_id(&self, id: DbId) -> Result<bool, BackendError>;

    async fn delete_by_id(&self, id: DbId) -> Result<bool, BackendError>;
}

/// Persistence for single-use verification tokens.
#[async_trait]
pub trait VerificationTokenStore: Send + Sync {
    async fn find_by_user(
        &self,
        user_id: DbId,
        purpose: VerificationPurpose,
    ) -> Result<Option<VerificationToken>, BackendError>;

    async fn find_by_token(
        &self,
        token: &str,
        purpose: VerificationPurpose,
    ) -> Result<Option<VerificationToken>, BackendError>;

    async fn insert(
        &self,
        input: &CreateVerificationToken,
    ) -> Result<VerificationToken, BackendError>;

    async fn delete_by_id(&self, id: DbId) -> Result<bool, BackendError>;
}

/// A fast, possibly stale mirror of active sessions.
///
/// `Ok(None)` from [`SessionCache::get`] is an ordinary miss, never an error.
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CachedSessionView>, BackendError>;
    async fn set(
        &self,
        key: &str,
        view: &CachedSessionView,
        ttl: Duration,
    ) -> Result<(), BackendError>;

    /// Returns `true` if an entry was removed.
    async fn remove(&self, key: &str) -> Result<bool, BackendError>;
}

/// Outbound account email.
#[async_trait]
pub trait MailDispatch: Send + Sync {
    async fn send_verify_email(&self, address: &str, token: &str) -> Result<(), BackendError>;
    async fn send_reset_password_email(&self, address: &str, token: &str)
        -> Result<(), BackendError>;
}

/// Password hashing and verification.
///
/// Implementations must compare in constant time.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, BackendError>;

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, BackendError>;
}
