//! In-process implementations of the store ports.
//!
//! They honour the same contracts as [`crate::store::PgStore`] (newest
//! non-revoked session wins, unique usernames and emails) and count writes
//! so callers can assert that a read-only path stayed read-only.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use authgate_core::types::{DbId, Timestamp};
use authgate_db::models::session::{CreateSession, Session};
use authgate_db::models::user::{CreateUser, User};
use authgate_db::models::verification_token::{
    CreateVerificationToken, VerificationPurpose, VerificationToken,
};
use chrono::Utc;
use tokio::sync::RwLock;

use crate::backend::BackendError;
use crate::ports::{SessionStore, UserDirectory, VerificationTokenStore};

pub use crate::cache::MemorySessionCache;

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: RwLock<Vec<User>>,
    writes: AtomicUsize,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn get(&self, id: DbId) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }

    async fn update<F: FnOnce(&mut User)>(&self, id: DbId, f: F) -> bool {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                f(user);
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, BackendError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, BackendError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, BackendError> {
        Ok(self.get(id).await)
    }

    async fn insert(&self, input: &CreateUser) -> Result<User, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == input.username) {
            return Err(BackendError::Duplicate("uq_users_username".into()));
        }
        if users.iter().any(|u| u.email == input.email) {
            return Err(BackendError::Duplicate("uq_users_email".into()));
        }
        let now = Utc::now();
        let user = User {
            id: DbId::new_v4(),
            username: input.username.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role.clone(),
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_verified(&self, id: DbId) -> Result<bool, BackendError> {
        Ok(self.update(id, |u| u.is_verified = true).await)
    }

    async fn update_password_hash(
        &self,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, BackendError> {
        Ok(self
            .update(id, |u| u.password_hash = password_hash.to_string())
            .await)
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<Vec<Session>>,
    writes: AtomicUsize,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Insert a session with chosen expiries, bypassing the write counter.
    pub async fn seed(
        &self,
        user_id: DbId,
        access_expires_at: Timestamp,
        refresh_expires_at: Timestamp,
    ) -> Session {
        let now = Utc::now();
        let session = Session {
            id: DbId::new_v4(),
            user_id,
            token_type: authgate_db::models::session::BEARER_TOKEN_TYPE.to_string(),
            provider: authgate_db::models::session::LOCAL_PROVIDER.to_string(),
            access_token: format!("seeded-access-{}", DbId::new_v4()),
            refresh_token: format!("seeded-refresh-{}", DbId::new_v4()),
            access_expires_at,
            refresh_expires_at,
            is_revoked: false,
            revoked_at: None,
            created_at: now,
            updated_at: now,
        };
        self.sessions.write().await.push(session.clone());
        session
    }

    pub async fn get(&self, id: DbId) -> Option<Session> {
        self.sessions.read().await.iter().find(|s| s.id == id).cloned()
    }

    /// The row [`SessionStore::find_by_user_id`] would return.
    pub async fn find_current(&self, user_id: DbId) -> Option<Session> {
        self.sessions
            .read()
            .await
            .iter()
            .rev()
            .find(|s| s.user_id == user_id && !s.is_revoked)
            .cloned()
    }

    /// Every session row for a user, revoked or not, oldest first.
    pub async fn all_for_user(&self, user_id: DbId) -> Vec<Session> {
        self.sessions
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, input: &CreateSession) -> Result<Session, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let session = Session {
            id: DbId::new_v4(),
            user_id: input.user_id,
            token_type: input.token_type.clone(),
            provider: input.provider.clone(),
            access_token: input.access_token.clone(),
            refresh_token: input.refresh_token.clone(),
            access_expires_at: input.access_expires_at,
            refresh_expires_at: input.refresh_expires_at,
            is_revoked: false,
            revoked_at: None,
            created_at: now,
            updated_at: now,
        };
        self.sessions.write().await.push(session.clone());
        Ok(session)
    }

    async fn find_by_user_id(&self, user_id: DbId) -> Result<Option<Session>, BackendError> {
        // Rows are appended in creation order, so the last match is the newest.
        Ok(self.find_current(user_id).await)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Session>, BackendError> {
        Ok(self.get(id).await)
    }

    async fn revoke_by_id(&self, id: DbId) -> Result<bool, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut sessions = self.sessions.write().await;
        match sessions.iter_mut().find(|s| s.id == id && !s.is_revoked) {
            Some(session) => {
                let now = Utc::now();
                session.is_revoked = true;
                session.revoked_at = Some(now);
                session.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: DbId) -> Result<bool, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        Ok(sessions.len() < before)
    }
}

// ---------------------------------------------------------------------------
// Verification tokens
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryVerificationTokenStore {
    tokens: RwLock<Vec<VerificationToken>>,
    writes: AtomicUsize,
}

impl MemoryVerificationTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// All stored records, in insertion order.
    pub async fn all(&self) -> Vec<VerificationToken> {
        self.tokens.read().await.clone()
    }

    /// Move a record's stored expiry, leaving the signed token untouched.
    pub async fn set_expires_at(&self, id: DbId, expires_at: Timestamp) -> bool {
        let mut tokens = self.tokens.write().await;
        match tokens.iter_mut().find(|t| t.id == id) {
            Some(token) => {
                token.expires_at = expires_at;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl VerificationTokenStore for MemoryVerificationTokenStore {
    async fn find_by_user(
        &self,
        user_id: DbId,
        purpose: VerificationPurpose,
    ) -> Result<Option<VerificationToken>, BackendError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .iter()
            .rev()
            .find(|t| t.user_id == user_id && t.purpose == purpose.as_str())
            .cloned())
    }

    async fn find_by_token(
        &self,
        token: &str,
        purpose: VerificationPurpose,
    ) -> Result<Option<VerificationToken>, BackendError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .iter()
            .find(|t| t.token == token && t.purpose == purpose.as_str())
            .cloned())
    }

    async fn insert(
        &self,
        input: &CreateVerificationToken,
    ) -> Result<VerificationToken, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut tokens = self.tokens.write().await;
        if tokens.iter().any(|t| t.token == input.token) {
            return Err(BackendError::Duplicate(
                "uq_verification_tokens_token".into(),
            ));
        }
        let now = Utc::now();
        let record = VerificationToken {
            id: DbId::new_v4(),
            user_id: input.user_id,
            purpose: input.purpose.as_str().to_string(),
            email: input.email.clone(),
            token: input.token.clone(),
            is_used: false,
            is_expired: false,
            expires_at: input.expires_at,
            created_at: now,
            updated_at: now,
        };
        tokens.push(record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, id: DbId) -> Result<bool, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| t.id != id);
        Ok(tokens.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use authgate_db::models::user::DEFAULT_ROLE;
    use chrono::Duration;

    fn new_user(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: DEFAULT_ROLE.into(),
        }
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_rejected() {
        let users = MemoryUserDirectory::new();
        users.insert(&new_user("alice", "a@x.io")).await.unwrap();

        let err = users.insert(&new_user("alice", "b@x.io")).await.unwrap_err();
        assert_matches!(err, BackendError::Duplicate(c) if c == "uq_users_username");

        let err = users.insert(&new_user("bob", "a@x.io")).await.unwrap_err();
        assert_matches!(err, BackendError::Duplicate(c) if c == "uq_users_email");
    }

    #[tokio::test]
    async fn newest_unrevoked_session_is_current() {
        let store = MemorySessionStore::new();
        let user_id = DbId::new_v4();
        let later = Utc::now() + Duration::days(1);
        let first = store.seed(user_id, later, later).await;
        let second = store.seed(user_id, later, later).await;

        let current = store.find_by_user_id(user_id).await.unwrap().unwrap();
        assert_eq!(current.id, second.id);

        assert!(store.revoke_by_id(second.id).await.unwrap());
        assert!(!store.revoke_by_id(second.id).await.unwrap());
        let current = store.find_by_user_id(user_id).await.unwrap().unwrap();
        assert_eq!(current.id, first.id);
    }

    #[tokio::test]
    async fn reads_do_not_count_as_writes() {
        let store = MemorySessionStore::new();
        let user_id = DbId::new_v4();
        let later = Utc::now() + Duration::days(1);
        let seeded = store.seed(user_id, later, later).await;
        store.find_by_user_id(user_id).await.unwrap();
        store.find_by_id(seeded.id).await.unwrap();
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn tokens_are_scoped_by_purpose() {
        let store = MemoryVerificationTokenStore::new();
        let user_id = DbId::new_v4();
        store
            .insert(&CreateVerificationToken {
                user_id,
                purpose: VerificationPurpose::EmailVerify,
                email: "a@x.io".into(),
                token: "t1".into(),
                expires_at: Utc::now() + Duration::minutes(15),
            })
            .await
            .unwrap();

        assert!(store
            .find_by_token("t1", VerificationPurpose::ResetPassword)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_user(user_id, VerificationPurpose::EmailVerify)
            .await
            .unwrap()
            .is_some());
    }
}
