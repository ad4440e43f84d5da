//! The login state machine.
//!
//! [`SessionLifecycleManager::login`] decides, per attempt, whether the
//! user's session is reused, has its access token renewed, or is replaced.
//! The durable [`SessionStore`] alone decides whether a session exists and
//! whether it is revoked; the [`SessionCache`] only spares the store a read
//! on warm logins, and a cache miss is always repaired from the store.
//!
//! # Concurrent logins
//!
//! There is no cross-request mutual exclusion. Two simultaneous first logins
//! for the same user can both see "no session" and both create one; only the
//! newer row is then returned by [`SessionStore::find_by_user_id`]. Strict
//! single-session-per-user would need a per-user lock or a conditional insert
//! in the store.

use std::sync::Arc;
use std::time::Duration;

use authgate_core::error::CoreError;
use authgate_core::types::{DbId, Timestamp};
use authgate_db::models::session::{CreateSession, Session, BEARER_TOKEN_TYPE, LOCAL_PROVIDER};
use authgate_db::models::user::User;
use chrono::Utc;
use serde::Serialize;

use crate::backend::BackendError;
use crate::cache::{session_key, ttl_until, CachedSessionView};
use crate::ports::{PasswordHasher, SessionCache, SessionStore, UserDirectory};
use crate::signer::{TokenPurpose, TokenSigner};

/// TTL used when a missing cache entry is rebuilt from the durable row.
pub const CACHE_REPAIR_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default budget for a whole login or logout attempt.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(5);

/// What a successful login hands back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionHandle {
    pub session_id: DbId,
    pub token_type: String,
    pub access_token: String,
    pub access_expires_at: Timestamp,
}

impl SessionHandle {
    fn from_view(view: &CachedSessionView) -> Self {
        Self {
            session_id: view.session_id,
            token_type: BEARER_TOKEN_TYPE.to_string(),
            access_token: view.access_token.clone(),
            access_expires_at: view.access_token_expires,
        }
    }
}

/// Orchestrates login and logout against the durable store and the cache.
pub struct SessionLifecycleManager {
    users: Arc<dyn UserDirectory>,
    sessions: Arc<dyn SessionStore>,
    cache: Arc<dyn SessionCache>,
    hasher: Arc<dyn PasswordHasher>,
    signer: Arc<TokenSigner>,
    timeout: Duration,
}

impl SessionLifecycleManager {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        sessions: Arc<dyn SessionStore>,
        cache: Arc<dyn SessionCache>,
        hasher: Arc<dyn PasswordHasher>,
        signer: Arc<TokenSigner>,
    ) -> Self {
        Self {
            users,
            sessions,
            cache,
            hasher,
            signer,
            timeout: DEFAULT_LOGIN_TIMEOUT,
        }
    }

    /// Override the per-attempt time budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Authenticate `username` and return a handle to their current session.
    ///
    /// Errors: `InvalidInput` for blank fields, `NotFound` for an unknown
    /// user, `InvalidCredentials` for a wrong password, `Internal` for any
    /// collaborator fault or when the attempt exceeds its time budget.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionHandle, CoreError> {
        match tokio::time::timeout(self.timeout, self.login_inner(username, password)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(username, timeout = ?self.timeout, "Login timed out");
                Err(CoreError::Internal("Login timed out".into()))
            }
        }
    }

    /// Revoke `session_id` and drop its cache entry.
    ///
    /// The session must belong to `user_id`; otherwise, or if it is already
    /// revoked, `NotFound` is returned.
    pub async fn logout(&self, user_id: DbId, session_id: DbId) -> Result<(), CoreError> {
        match tokio::time::timeout(self.timeout, self.logout_inner(user_id, session_id)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(%user_id, %session_id, "Logout timed out");
                Err(CoreError::Internal("Logout timed out".into()))
            }
        }
    }

    async fn login_inner(&self, username: &str, password: &str) -> Result<SessionHandle, CoreError> {
        // 1. Input validation, before any store access.
        if username.trim().is_empty() || password.is_empty() {
            return Err(CoreError::InvalidInput(
                "Username and password are required".into(),
            ));
        }

        // 2. Credential check.
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(CoreError::NotFound { entity: "User" })?;

        if !self.hasher.verify(password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(CoreError::InvalidCredentials);
        }

        // 3. Durable session lookup.
        let now = Utc::now();
        match self.sessions.find_by_user_id(user.id).await? {
            None => self.create_session(&user).await,
            Some(session) if session.is_refresh_token_expired(now) => {
                tracing::info!(
                    user_id = %user.id,
                    session_id = %session.id,
                    "Refresh token expired, replacing session",
                );
                self.sessions.revoke_by_id(session.id).await?;
                self.create_session(&user).await
            }
            Some(session) => self.resume_session(&user, session).await,
        }
    }

    /// Mint a token pair, persist a new session and mirror it in the cache.
    async fn create_session(&self, user: &User) -> Result<SessionHandle, CoreError> {
        let subject = user.id.to_string();
        let access = self
            .signer
            .issue_default(TokenPurpose::Access, &subject)
            .map_err(BackendError::from)?;
        let refresh = self
            .signer
            .issue_default(TokenPurpose::Refresh, &subject)
            .map_err(BackendError::from)?;

        let session = self
            .sessions
            .insert(&CreateSession {
                user_id: user.id,
                token_type: BEARER_TOKEN_TYPE.to_string(),
                provider: LOCAL_PROVIDER.to_string(),
                access_token: access.token,
                refresh_token: refresh.token,
                access_expires_at: access.expires_at,
                refresh_expires_at: refresh.expires_at,
            })
            .await?;

        let view = CachedSessionView::from(&session);
        self.cache
            .set(
                &session_key(session.id),
                &view,
                ttl_until(session.refresh_expires_at),
            )
            .await?;

        tracing::info!(user_id = %user.id, session_id = %session.id, "Session created");
        Ok(SessionHandle::from_view(&view))
    }

    /// Continue a session whose durable refresh token is still valid.
    async fn resume_session(
        &self,
        user: &User,
        session: Session,
    ) -> Result<SessionHandle, CoreError> {
        let key = session_key(session.id);

        let view = match self.cache.get(&key).await? {
            Some(view) => view,
            None => {
                let view = CachedSessionView::from(&session);
                self.cache.set(&key, &view, CACHE_REPAIR_TTL).await?;
                tracing::warn!(
                    user_id = %user.id,
                    session_id = %session.id,
                    "Session missing from cache, repaired from store",
                );
                view
            }
        };

        let now = Utc::now();
        if !view.is_access_token_expired(now) {
            tracing::debug!(user_id = %user.id, session_id = %view.session_id, "Session reused");
            return Ok(SessionHandle::from_view(&view));
        }

        if view.is_refresh_token_expired(now) {
            tracing::info!(
                user_id = %user.id,
                session_id = %view.session_id,
                "Both tokens expired, replacing session",
            );
            self.cache.remove(&key).await?;
            self.sessions.revoke_by_id(session.id).await?;
            return self.create_session(user).await;
        }

        // Access token expired, refresh token valid: renew in the cache only.
        let access = self
            .signer
            .issue_default(TokenPurpose::Access, &user.id.to_string())
            .map_err(BackendError::from)?;
        let renewed = CachedSessionView {
            access_token: access.token,
            access_token_expires: access.expires_at,
            ..view
        };
        self.cache
            .set(&key, &renewed, ttl_until(renewed.refresh_token_expires))
            .await?;

        tracing::info!(user_id = %user.id, session_id = %renewed.session_id, "Access token renewed");
        Ok(SessionHandle::from_view(&renewed))
    }

    async fn logout_inner(&self, user_id: DbId, session_id: DbId) -> Result<(), CoreError> {
        let session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .filter(|s| s.user_id == user_id && !s.is_revoked)
            .ok_or(CoreError::NotFound { entity: "Session" })?;

        self.sessions.revoke_by_id(session.id).await?;
        self.cache.remove(&session_key(session.id)).await?;

        tracing::info!(%user_id, %session_id, "Session revoked by logout");
        Ok(())
    }
}
