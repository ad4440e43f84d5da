//! Redis-backed [`SessionCache`].
//!
//! Views are stored as JSON strings with `SET ... EX`. A value that no longer
//! decodes (e.g. written by an older build) is treated as a miss so the
//! caller rebuilds it from the durable store.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::CachedSessionView;
use crate::backend::BackendError;
use crate::ports::SessionCache;

/// Session cache shared across instances through Redis.
#[derive(Clone)]
pub struct RedisSessionCache {
    conn: ConnectionManager,
}

impl RedisSessionCache {
    /// Connect to Redis at `url` (e.g. `redis://127.0.0.1:6379/0`).
    ///
    /// The returned manager reconnects on its own after transient failures.
    pub async fn connect(url: &str) -> Result<Self, BackendError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn get(&self, key: &str) -> Result<Option<CachedSessionView>, BackendError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(view) => Ok(Some(view)),
            Err(e) => {
                tracing::warn!(key, error = %e, "Undecodable cached session, treating as miss");
                Ok(None)
            }
        }
    }

    async fn set(
        &self,
        key: &str,
        view: &CachedSessionView,
        ttl: Duration,
    ) -> Result<(), BackendError> {
        let json = serde_json::to_string(view)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, json, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, BackendError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }
}
