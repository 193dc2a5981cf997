//! Key-value store trait.
//!
//! The history store lives behind this interface; implementations live in
//! chatrelay-infra.

use chatrelay_types::error::StoreError;

/// Trait for an expiring JSON key-value store.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition). Entries whose
/// TTL has elapsed must be invisible to `get`.
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist or expired.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, StoreError>> + Send;

    /// Overwrite the value for a key, expiring after `ttl_secs`.
    fn put(
        &self,
        key: &str,
        value: &serde_json::Value,
        ttl_secs: u64,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(&self, key: &str) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
