//! In-process [`SessionCache`] with per-entry expiry.
//!
//! Used when no Redis URL is configured, and by tests. Entries are only
//! visible to the process that wrote them. Expired entries are dropped on
//! every write, so abandoned session keys do not accumulate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::CachedSessionView;
use crate::backend::BackendError;
use crate::ports::SessionCache;

struct Entry {
    view: CachedSessionView,
    expires_at: Instant,
}

/// Process-local session cache.
#[derive(Default)]
pub struct MemorySessionCache {
    entries: RwLock<HashMap<String, Entry>>,
    writes: AtomicUsize,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set`/`remove` calls served so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Live (unexpired) entry count.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remaining lifetime of an entry, if present and unexpired.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.expires_at - now)
    }

    /// Drop an entry without counting it as a write, to simulate eviction.
    pub async fn evict(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    async fn get(&self, key: &str) -> Result<Option<CachedSessionView>, BackendError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.view.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        view: &CachedSessionView,
        ttl: Duration,
    ) -> Result<(), BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                view: view.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.write().await.remove(key).is_some())
    }
}
