//! In-process key-value store.
//!
//! Backs `--store memory` and tests. Entries vanish on restart.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chatrelay_core::storage::kv_store::KvStore;
use chatrelay_types::error::StoreError;
use dashmap::DashMap;

struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
}

/// `DashMap`-backed implementation of `KvStore` with lazy expiry.
///
/// Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry. Returns the number removed.
    ///
    /// Reads only evict the key they touch, so abandoned sessions stay in
    /// the map until a sweep.
    pub fn purge_expired(&self) -> u64 {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| e.expires_at > now);
        before.saturating_sub(self.entries.len()) as u64
    }

    /// Entries held in the map, expired or not.
    pub(crate) fn stored_len(&self) -> usize {
        self.entries.len()
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove_if(key, |_, e| e.expires_at <= now);
        }
        Ok(None)
    }

    async fn put(
        &self,
        key: &str,
        value: &serde_json::Value,
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(ttl_secs))
            .unwrap_or(now + Duration::from_secs(u32::MAX as u64));

        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
