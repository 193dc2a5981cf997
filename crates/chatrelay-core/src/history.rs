//! Rolling conversation history keyed by session id.
//!
//! The whole history is read and overwritten as one JSON array. There is no
//! read-modify-write atomicity: two concurrent requests for the same session
//! race and the last write wins.

use chatrelay_types::chat::Turn;
use chatrelay_types::error::StoreError;
use tracing::debug;

use crate::storage::kv_store::KvStore;

/// Default number of prior turns sent upstream with each request.
pub const MAX_HISTORY_MESSAGES: usize = 10;

/// Default lifetime of a stored history: 30 days.
pub const HISTORY_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Upper bound on stored turns for a window of `max_history`.
pub fn stored_limit(max_history: usize) -> usize {
    (max_history + 1) * 2
}

/// Append one user/model exchange and keep the newest `stored_limit` turns.
pub fn append_exchange(
    mut history: Vec<Turn>,
    user_text: &str,
    model_text: &str,
    max_history: usize,
) -> Vec<Turn> {
    history.push(Turn::user(user_text));
    history.push(Turn::model(model_text));

    let limit = stored_limit(max_history);
    if history.len() > limit {
        history.drain(..history.len() - limit);
    }
    history
}

/// The last `n` turns of `history` (all of them when there are fewer).
pub fn recent(history: &[Turn], n: usize) -> &[Turn] {
    &history[history.len().saturating_sub(n)..]
}

/// Gateway between sessions and their stored turns.
pub struct HistoryStore<K: KvStore> {
    kv: K,
}

impl<K: KvStore> HistoryStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Access the underlying store.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Load the history for a session.
    ///
    /// A missing key, an unparsable or non-array value, and array elements
    /// that are not turns all read as empty. Backend failures are returned.
    pub async fn get(&self, session_id: &str) -> Result<Vec<Turn>, StoreError> {
        let value = match self.kv.get(session_id).await {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(Vec::new()),
            Err(StoreError::Serialization(e)) => {
                debug!(
                    session_id,
                    error = %e,
                    "Stored history is not valid JSON, treating as empty"
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let serde_json::Value::Array(items) = value else {
            debug!(session_id, "Stored history is not an array, treating as empty");
            return Ok(Vec::new());
        };

        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<Turn>(item).ok())
            .collect())
    }

    /// Overwrite the history for a session.
    pub async fn put(
        &self,
        session_id: &str,
        turns: &[Turn],
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(turns)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.kv.put(session_id, &value, ttl_secs).await
    }

    /// Remove a session's history.
    pub async fn clear(&self, session_id: &str) -> Result<(), StoreError> {
        self.kv.delete(session_id).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-process store recording the last TTL it was given.
    #[derive(Default)]
    pub(crate) struct MapStore {
        pub(crate) entries: Mutex<HashMap<String, serde_json::Value>>,
        pub(crate) last_ttl: Mutex<Option<u64>>,
        pub(crate) fail_writes: bool,
        pub(crate) fail_reads: bool,
        /// Key whose stored value fails to parse.
        pub(crate) corrupt_key: Option<String>,
    }

    impl KvStore for MapStore {
        async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
            if self.fail_reads {
                return Err(StoreError::Backend("read timeout".to_string()));
            }
            if self.corrupt_key.as_deref() == Some(key) {
                return Err(StoreError::Serialization("expected value at line 1".to_string()));
            }
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn put(
            &self,
            key: &str,
            value: &serde_json::Value,
            ttl_secs: u64,
        ) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Backend("write refused".to_string()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.clone());
            *self.last_ttl.lock().unwrap() = Some(ttl_secs);
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn turns(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("u{i}"))
                } else {
                    Turn::model(format!("m{i}"))
                }
            })
            .collect()
    }

    #[test]
    fn test_append_exchange_keeps_bound() {
        let mut history = Vec::new();
        for i in 0..50 {
            history = append_exchange(history, &format!("q{i}"), &format!("a{i}"), 3);
            assert!(history.len() <= stored_limit(3));
        }
        assert_eq!(history.len(), 8);
        assert_eq!(history.last().unwrap(), &Turn::model("a49"));
        assert_eq!(history[0], Turn::user("q46"));
    }

    #[test]
    fn test_recent_takes_tail() {
        let h = turns(7);
        assert_eq!(recent(&h, 3), &h[4..]);
        assert_eq!(recent(&h, 100).len(), 7);
        assert!(recent(&h, 0).is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_empty() {
        let store = HistoryStore::new(MapStore::default());
        assert!(store.get("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_coerces_non_array() {
        let kv = MapStore::default();
        kv.entries
            .lock()
            .unwrap()
            .insert("s".to_string(), serde_json::json!({"role": "user"}));
        let store = HistoryStore::new(kv);
        assert!(store.get("s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_skips_malformed_items() {
        let kv = MapStore::default();
        kv.entries.lock().unwrap().insert(
            "s".to_string(),
            serde_json::json!([
                {"role": "user", "text": "hi"},
                42,
                {"role": "model"},
                {"role": "model", "text": "hello"}
            ]),
        );
        let store = HistoryStore::new(kv);
        let got = store.get("s").await.unwrap();
        assert_eq!(got, vec![Turn::user("hi"), Turn::model("hello")]);
    }

    #[tokio::test]
    async fn test_get_unparsable_value_is_empty() {
        let store = HistoryStore::new(MapStore {
            corrupt_key: Some("s".to_string()),
            ..Default::default()
        });
        assert!(store.get("s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_propagates_backend_error() {
        let store = HistoryStore::new(MapStore {
            fail_reads: true,
            ..Default::default()
        });
        let err = store.get("s").await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn test_put_overwrites_with_ttl() {
        let store = HistoryStore::new(MapStore::default());
        store.put("s", &turns(4), 60).await.unwrap();
        store.put("s", &[Turn::user("only")], 120).await.unwrap();

        assert_eq!(store.get("s").await.unwrap(), vec![Turn::user("only")]);
        assert_eq!(*store.kv().last_ttl.lock().unwrap(), Some(120));
    }

    #[tokio::test]
    async fn test_clear_removes_history() {
        let store = HistoryStore::new(MapStore::default());
        store.put("s", &turns(2), 60).await.unwrap();
        store.clear("s").await.unwrap();
        assert!(store.get("s").await.unwrap().is_empty());
    }
}
