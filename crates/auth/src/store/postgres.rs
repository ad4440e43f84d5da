//! PostgreSQL implementation of the store ports, delegating to the
//! repositories in `authgate-db`.

use async_trait::async_trait;
use authgate_core::types::{DbId, Timestamp};
use authgate_db::models::session::{CreateSession, Session};
use authgate_db::models::user::{CreateUser, User};
use authgate_db::models::verification_token::{
    CreateVerificationToken, VerificationPurpose, VerificationToken,
};
use authgate_db::repositories::{SessionRepo, UserRepo, VerificationTokenRepo};
use authgate_db::DbPool;

use crate::backend::{classify_sqlx_error, BackendError};
use crate::ports::{SessionStore, UserDirectory, VerificationTokenStore};

/// User, session and verification-token storage on one connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Delete sessions that were revoked, or whose refresh token lapsed,
    /// before `cutoff`. Returns the number of rows removed.
    pub async fn delete_stale_sessions(&self, cutoff: Timestamp) -> Result<u64, BackendError> {
        Ok(SessionRepo::delete_stale(&self.pool, cutoff).await?)
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, BackendError> {
        Ok(UserRepo::find_by_username(&self.pool, username).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, BackendError> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, BackendError> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn insert(&self, input: &CreateUser) -> Result<User, BackendError> {
        UserRepo::create(&self.pool, input)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn update_verified(&self, id: DbId) -> Result<bool, BackendError> {
        Ok(UserRepo::mark_verified(&self.pool, id).await?)
    }

    async fn update_password_hash(
        &self,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, BackendError> {
        Ok(UserRepo::update_password(&self.pool, id, password_hash).await?)
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn insert(&self, input: &CreateSession) -> Result<Session, BackendError> {
        Ok(SessionRepo::create(&self.pool, input).await?)
    }

    async fn find_by_user_id(&self, user_id: DbId) -> Result<Option<Session>, BackendError> {
        Ok(SessionRepo::find_current_for_user(&self.pool, user_id).await?)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Session>, BackendError> {
        Ok(SessionRepo::find_by_id(&self.pool, id).await?)
    }

    async fn revoke_by_id(&self, id: DbId) -> Result<bool, BackendError> {
        Ok(SessionRepo::revoke(&self.pool, id).await?)
    }

    async fn delete_by_id(&self, id: DbId) -> Result<bool, BackendError> {
        Ok(SessionRepo::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl VerificationTokenStore for PgStore {
    async fn find_by_user(
        &self,
        user_id: DbId,
        purpose: VerificationPurpose,
    ) -> Result<Option<VerificationToken>, BackendError> {
        Ok(VerificationTokenRepo::find_by_user(&self.pool, user_id, purpose).await?)
    }

    async fn find_by_token(
        &self,
        token: &str,
        purpose: VerificationPurpose,
    ) -> Result<Option<VerificationToken>, BackendError> {
        Ok(VerificationTokenRepo::find_by_token(&self.pool, token, purpose).await?)
    }

    async fn insert(
        &self,
        input: &CreateVerificationToken,
    ) -> Result<VerificationToken, BackendError> {
        VerificationTokenRepo::create(&self.pool, input)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn delete_by_id(&self, id: DbId) -> Result<bool, BackendError> {
        Ok(VerificationTokenRepo::delete(&self.pool, id).await?)
    }
}
