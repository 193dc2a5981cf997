//! Runtime selection of the history store backend.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chatrelay_core::storage::kv_store::KvStore;
use chatrelay_types::error::StoreError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::memory::MemoryKvStore;
use crate::sqlite::kv::SqliteKvStore;

/// Default time between expiry sweeps of a running server.
pub const PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// `tokio::time::interval` panics on a zero period.
const MIN_PURGE_INTERVAL: Duration = Duration::from_millis(10);

/// Which backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Memory,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Sqlite => write!(f, "sqlite"),
            StoreKind::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StoreKind::Sqlite),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("invalid store kind: '{other}'")),
        }
    }
}

/// A `KvStore` chosen at runtime.
///
/// `KvStore` uses RPITIT and is not object-safe, so backends are dispatched
/// through this enum instead of a trait object.
#[derive(Clone)]
pub enum StoreBackend {
    Sqlite(SqliteKvStore),
    Memory(MemoryKvStore),
}

impl StoreBackend {
    pub fn kind(&self) -> StoreKind {
        match self {
            StoreBackend::Sqlite(_) => StoreKind::Sqlite,
            StoreBackend::Memory(_) => StoreKind::Memory,
        }
    }

    /// Remove expired entries from the backend. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.purge_expired().await,
            StoreBackend::Memory(m) => Ok(m.purge_expired()),
        }
    }

    /// Sweep expired entries every `every`, starting immediately.
    ///
    /// The task runs until aborted or the runtime shuts down.
    pub fn spawn_purge_task(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let every = every.max(MIN_PURGE_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match store.purge_expired().await {
                    Ok(0) => {}
                    Ok(removed) => {
                        tracing::info!(removed, store = %store.kind(), "Purged expired histories");
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            store = %store.kind(),
                            "Failed to purge expired histories"
                        );
                    }
                }
            }
        })
    }
}

impl KvStore for StoreBackend {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.get(key).await,
            StoreBackend::Memory(m) => m.get(key).await,
        }
    }

    async fn put(
        &self,
        key: &str,
        value: &serde_json::Value,
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.put(key, value, ttl_secs).await,
            StoreBackend::Memory(m) => m.put(key, value, ttl_secs).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.delete(key).await,
            StoreBackend::Memory(m) => m.delete(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_kind_parse() {
        assert_eq!("SQLite".parse::<StoreKind>().unwrap(), StoreKind::Sqlite);
        assert_eq!("memory".parse::<StoreKind>().unwrap(), StoreKind::Memory);
        assert!("redis".parse::<StoreKind>().is_err());
    }

    #[tokio::test]
    async fn test_purge_task_sweeps_memory() {
        let memory = MemoryKvStore::new();
        let backend = StoreBackend::Memory(memory.clone());
        backend.put("stale", &serde_json::json!([]), 0).await.unwrap();
        backend.put("live", &serde_json::json!([]), 60).await.unwrap();
        assert_eq!(memory.stored_len(), 2);

        let task = backend.spawn_purge_task(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        task.abort();

        assert_eq!(memory.stored_len(), 1);
        assert!(backend.get("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_backend_dispatches_to_memory() {
        let backend = StoreBackend::Memory(MemoryKvStore::new());
        assert_eq!(backend.kind(), StoreKind::Memory);

        backend.put("k", &serde_json::json!(1), 60).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some(serde_json::json!(1)));
    }
}
