//! Login session model and DTOs.

use authgate_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Token type recorded on every session row.
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

/// Provider tag for username/password logins.
pub const LOCAL_PROVIDER: &str = "local";

/// A session row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub token_type: String,
    pub provider: String,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: Timestamp,
    pub refresh_expires_at: Timestamp,
    pub is_revoked: bool,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Session {
    pub fn is_access_token_expired(&self, now: Timestamp) -> bool {
        now > self.access_expires_at
    }

    pub fn is_refresh_token_expired(&self, now: Timestamp) -> bool {
        now > self.refresh_expires_at
    }

    /// Not revoked and neither token has expired.
    pub fn is_active(&self, now: Timestamp) -> bool {
        !self.is_revoked && !self.is_access_token_expired(now) && !self.is_refresh_token_expired(now)
    }
}

/// DTO for creating a new session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: DbId,
    pub token_type: String,
    pub provider: String,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: Timestamp,
    pub refresh_expires_at: Timestamp,
}
