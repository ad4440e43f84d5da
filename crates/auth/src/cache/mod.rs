//! The cached projection of a session and the caches that hold it.
//!
//! - [`redis`] -- shared cache for multi-instance deployments.
//! - [`memory`] -- in-process cache used when no Redis URL is configured.

pub mod memory;
pub mod redis;

use std::time::Duration;

use authgate_core::types::{DbId, Timestamp};
use authgate_db::models::session::Session;
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub use self::memory::MemorySessionCache;
pub use self::redis::RedisSessionCache;

/// Shortest TTL ever handed to a cache; keeps already-lapsed views writable.
const MIN_TTL: Duration = Duration::from_secs(1);

/// Cache key for a session.
pub fn session_key(session_id: DbId) -> String {
    format!("session:{session_id}")
}

/// TTL that lets an entry live until `expires_at`, never less than one second.
pub fn ttl_until(expires_at: Timestamp) -> Duration {
    (expires_at - Utc::now())
        .to_std()
        .map(|ttl| ttl.max(MIN_TTL))
        .unwrap_or(MIN_TTL)
}

/// Denormalised copy of a [`Session`] kept in the session cache.
///
/// Not a source of truth: a missing entry means "rebuild from the store",
/// never "no session".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSessionView {
    pub user_id: DbId,
    pub session_id: DbId,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires: Timestamp,
    pub refresh_token_expires: Timestamp,
}

impl CachedSessionView {
    pub fn is_access_token_expired(&self, now: Timestamp) -> bool {
        now > self.access_token_expires
    }

    pub fn is_refresh_token_expired(&self, now: Timestamp) -> bool {
        now > self.refresh_token_expires
    }
}

impl From<&Session> for CachedSessionView {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            session_id: session.id,
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            access_token_expires: session.access_expires_at,
            refresh_token_expires: session.refresh_expires_at,
        }
    }
}
